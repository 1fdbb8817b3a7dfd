use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use pegrat_runtime::str::LineCol;

use crate::analysis;
use crate::ast::{Expr, RuleId};
use crate::engine;
use crate::error::{CompileError, ParseError, UnknownRuleError};
use crate::parser::ParseResult;

/// Name of the rule that defines what the parser skips between tokens.
pub const WHITESPACE_RULE: &str = "%whitespace";

/// Per-grammar parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Memoize rule results by position.
    pub packrat: bool,
    /// Require the start rule to consume the whole input, apart from trailing
    /// whitespace.
    pub eoi_check: bool,
    /// Maximum number of nested rule invocations before the parse is aborted.
    pub stack_limit: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            packrat: true,
            eoi_check: true,
            stack_limit: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub(crate) name: String,
    pub(crate) expr: Expr,
    pub(crate) token: bool,
    pub(crate) skip_whitespace: bool,
    pub(crate) location: Option<LineCol>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Token rules match their body without skipping whitespace inside it.
    pub fn is_token(&self) -> bool {
        self.token
    }

    pub fn skips_whitespace(&self) -> bool {
        self.skip_whitespace
    }

    /// Position of the definition in the grammar source, for compiled grammars.
    pub fn location(&self) -> Option<LineCol> {
        self.location
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Unreachable,
    LeftRecursion,
}

/// A problem in a grammar that does not prevent it from being used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub rule: String,
    pub message: String,
    pub location: Option<LineCol>,
}

impl fmt::Display for Warning {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&self.message)
    }
}

/// A compiled grammar. Immutable apart from its options, and shareable
/// across threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) rules: Vec<Rule>,
    index: HashMap<String, RuleId>,
    pub(crate) start: RuleId,
    pub(crate) whitespace: Option<RuleId>,
    warnings: Vec<Warning>,
    pub(crate) options: ParseOptions,
}

impl Grammar {
    /// Compile grammar text. See [`crate::compile`].
    pub fn compile(source: &str) -> Result<Grammar, CompileError> {
        crate::compiler::compile(source)
    }

    /// Match `input` against the start rule.
    pub fn parse(&self, input: &str) -> Result<ParseResult<()>, ParseError> {
        engine::parse(self, &[], self.start, input)
    }

    /// Match `input` against the named rule instead of the start rule.
    pub fn parse_rule(&self, rule: &str, input: &str) -> Result<ParseResult<()>, ParseError> {
        let id = self.rule_id(rule).ok_or_else(|| UnknownRuleError(rule.to_owned()))?;
        engine::parse(self, &[], id, input)
    }

    pub fn enable_packrat(&mut self, enable: bool) -> &mut Self {
        self.options.packrat = enable;
        self
    }

    pub fn enable_eoi_check(&mut self, enable: bool) -> &mut Self {
        self.options.eoi_check = enable;
        self
    }

    pub fn set_stack_limit(&mut self, limit: usize) -> &mut Self {
        self.options.stack_limit = limit;
        self
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ParseOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rule_id(name).map(|id| &self.rules[id.index()])
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied()
    }

    /// All rules, in definition order. A rule's position is its `RuleId`.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn start_rule(&self) -> &Rule {
        &self.rules[self.start.index()]
    }

    pub fn whitespace_rule(&self) -> Option<&Rule> {
        self.whitespace.map(|id| &self.rules[id.index()])
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// Prints the grammar in the notation accepted by [`Grammar::compile`].
impl fmt::Display for Grammar {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(fmt, "{} <- {}", rule.name, rule.expr)?;
        }
        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = CompileError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Grammar::compile(source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Definition {
    pub name: String,
    pub expr: Expr,
    pub location: Option<LineCol>,
}

/// Assembles a grammar from expressions built in code.
///
/// ```
/// use pegrat::{Expr, GrammarBuilder};
///
/// let grammar = GrammarBuilder::new()
///     .rule("list", Expr::seq([Expr::rule_ref("item"), Expr::zero_or_more(Expr::seq([Expr::literal(","), Expr::rule_ref("item")]))]))
///     .rule("item", Expr::one_or_more(Expr::class(&[('a', 'z')])))
///     .whitespace(Expr::zero_or_more(Expr::one_of(" \t")))
///     .build()
///     .unwrap();
///
/// assert!(grammar.parse("ab, c ,d").unwrap().is_matched());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    definitions: Vec<Definition>,
    start: Option<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, name: impl Into<String>, expr: Expr) -> Self {
        self.definitions.push(Definition {
            name: name.into(),
            expr,
            location: None,
        });
        self
    }

    /// Define the `%whitespace` rule.
    pub fn whitespace(self, expr: Expr) -> Self {
        self.rule(WHITESPACE_RULE, expr)
    }

    /// Use `name` as the start rule instead of the first rule defined.
    pub fn start(mut self, name: impl Into<String>) -> Self {
        self.start = Some(name.into());
        self
    }

    pub(crate) fn define(mut self, definition: Definition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn build(self) -> Result<Grammar, CompileError> {
        let mut index = HashMap::new();
        let mut rules = Vec::with_capacity(self.definitions.len());

        for def in self.definitions {
            let id = RuleId(rules.len());
            if index.insert(def.name.clone(), id).is_some() {
                return Err(CompileError::DuplicateRule {
                    name: def.name,
                    location: def.location,
                });
            }
            rules.push(Rule {
                name: def.name,
                expr: def.expr,
                token: false,
                skip_whitespace: false,
                location: def.location,
            });
        }

        analysis::resolve_refs(&mut rules, &index)?;

        let start = match self.start {
            Some(name) => *index.get(&name).ok_or(UnknownRuleError(name))?,
            None => rules
                .iter()
                .position(|r| r.name != WHITESPACE_RULE)
                .map(RuleId)
                .ok_or(CompileError::NoRules)?,
        };

        let whitespace = index.get(WHITESPACE_RULE).copied();
        let in_whitespace = match whitespace {
            Some(ws) => {
                if let Some(path) = analysis::self_reference(&rules, ws) {
                    return Err(CompileError::RecursiveWhitespace { path });
                }
                analysis::reachable(&rules, &[ws])
            }
            None => vec![false; rules.len()],
        };

        for (rule, in_ws) in rules.iter_mut().zip(in_whitespace) {
            rule.token = in_ws || is_token_name(&rule.name) || !rule.expr.has_rule_refs();
            rule.skip_whitespace = whitespace.is_some() && !rule.token;
        }

        let mut warnings = Vec::new();

        let mut roots = vec![start];
        roots.extend(whitespace);
        let used = analysis::reachable(&rules, &roots);
        for (rule, used) in rules.iter().zip(used) {
            if !used {
                warnings.push(Warning {
                    kind: WarningKind::Unreachable,
                    rule: rule.name.clone(),
                    message: format!("rule `{}` is never used", rule.name),
                    location: rule.location,
                });
            }
        }

        for cycle in analysis::left_recursion(&rules) {
            let rule = &rules[cycle[0].index()];
            let path: Vec<&str> = cycle.iter().chain(cycle.first()).map(|id| rules[id.index()].name.as_str()).collect();
            warnings.push(Warning {
                kind: WarningKind::LeftRecursion,
                rule: rule.name.clone(),
                message: format!(
                    "left recursive rules fail when re-entered at the same position: {}",
                    path.join(" -> ")
                ),
                location: rule.location,
            });
        }

        Ok(Grammar {
            rules,
            index,
            start,
            whitespace,
            warnings,
            options: ParseOptions::default(),
        })
    }
}

/// `EOF`, `HEX_DIGIT`: names without lowercase letters mark lexical rules.
fn is_token_name(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase()) && !name.chars().any(|c| c.is_lowercase())
}
