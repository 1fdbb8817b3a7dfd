use std::sync::Arc;

use pegrat_runtime::error::ParseFailure;
use pegrat_runtime::str::LineCol;

use crate::action::{ActionTable, BoxError, SemanticValues};
use crate::engine;
use crate::error::{CompileError, ParseError, UnknownRuleError};
use crate::grammar::Grammar;

/// Outcome of a parse call that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult<V> {
    /// The start rule matched `consumed` bytes of input. `value` is the
    /// start rule's semantic value, if it produced one.
    Matched { consumed: usize, value: Option<V> },
    /// The input did not match. The failure holds the furthest position the
    /// parser reached and what it expected there.
    Failed(ParseFailure<LineCol>),
}

impl<V> ParseResult<V> {
    pub fn is_matched(&self) -> bool {
        matches!(self, ParseResult::Matched { .. })
    }

    pub fn consumed(&self) -> Option<usize> {
        match self {
            ParseResult::Matched { consumed, .. } => Some(*consumed),
            ParseResult::Failed(_) => None,
        }
    }

    pub fn value(&self) -> Option<&V> {
        match self {
            ParseResult::Matched { value, .. } => value.as_ref(),
            ParseResult::Failed(_) => None,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            ParseResult::Matched { value, .. } => value,
            ParseResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ParseFailure<LineCol>> {
        match self {
            ParseResult::Matched { .. } => None,
            ParseResult::Failed(failure) => Some(failure),
        }
    }

    /// The value of a successful match, or the failure. A match without a
    /// value gives `Ok(None)`.
    pub fn into_result(self) -> Result<Option<V>, ParseFailure<LineCol>> {
        match self {
            ParseResult::Matched { value, .. } => Ok(value),
            ParseResult::Failed(failure) => Err(failure),
        }
    }
}

/// A grammar together with the semantic actions that build values of type
/// `V` from its matches.
///
/// ```
/// use pegrat::Parser;
///
/// let mut parser = Parser::<i64>::from_source(r"
///     Sum    <- Number ('+' Number)*
///     Number <- [0-9]+
///     %whitespace <- [ ]*
/// ").unwrap();
///
/// parser
///     .set_action("Sum", |sv| Ok(sv.values().iter().sum()))?
///     .set_action("Number", |sv| Ok(sv.text().parse()?))?;
///
/// assert_eq!(parser.parse("1 + 20 + 300").unwrap().into_value(), Some(321));
/// # Ok::<(), pegrat::error::UnknownRuleError>(())
/// ```
pub struct Parser<V = ()> {
    grammar: Grammar,
    actions: ActionTable<V>,
}

impl<V: Clone> Parser<V> {
    pub fn new(grammar: Grammar) -> Self {
        let actions = vec![None; grammar.rules.len()];
        Parser { grammar, actions }
    }

    /// Compile `source` and wrap the grammar with no actions registered.
    pub fn from_source(source: &str) -> Result<Self, CompileError> {
        Ok(Parser::new(Grammar::compile(source)?))
    }

    /// Register the action for `rule`, replacing any previous one.
    pub fn set_action<F>(&mut self, rule: &str, action: F) -> Result<&mut Self, UnknownRuleError>
    where
        F: Fn(SemanticValues<'_, V>) -> Result<V, BoxError> + Send + Sync + 'static,
    {
        let id = self.grammar.rule_id(rule).ok_or_else(|| UnknownRuleError(rule.to_owned()))?;
        self.actions[id.index()] = Some(Arc::new(action));
        Ok(self)
    }

    pub fn parse(&self, input: &str) -> Result<ParseResult<V>, ParseError> {
        engine::parse(&self.grammar, &self.actions, self.grammar.start, input)
    }

    pub fn parse_rule(&self, rule: &str, input: &str) -> Result<ParseResult<V>, ParseError> {
        let id = self.grammar.rule_id(rule).ok_or_else(|| UnknownRuleError(rule.to_owned()))?;
        engine::parse(&self.grammar, &self.actions, id, input)
    }

    pub fn enable_packrat(&mut self, enable: bool) -> &mut Self {
        self.grammar.enable_packrat(enable);
        self
    }

    pub fn enable_eoi_check(&mut self, enable: bool) -> &mut Self {
        self.grammar.enable_eoi_check(enable);
        self
    }

    pub fn set_stack_limit(&mut self, limit: usize) -> &mut Self {
        self.grammar.set_stack_limit(limit);
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }
}

impl<V> Clone for Parser<V> {
    fn clone(&self) -> Self {
        Parser {
            grammar: self.grammar.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<V> std::fmt::Debug for Parser<V> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let with_actions: Vec<&str> = self
            .grammar
            .rules
            .iter()
            .zip(&self.actions)
            .filter(|(_, action)| action.is_some())
            .map(|(rule, _)| rule.name.as_str())
            .collect();
        fmt.debug_struct("Parser")
            .field("grammar", &self.grammar)
            .field("actions", &with_actions)
            .finish()
    }
}

impl<V: Clone> From<Grammar> for Parser<V> {
    fn from(grammar: Grammar) -> Self {
        Parser::new(grammar)
    }
}
