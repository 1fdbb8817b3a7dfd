use std::fmt;

use pegrat_runtime::error::ParseFailure;
use pegrat_runtime::str::LineCol;
use thiserror::Error;

use crate::action::BoxError;

/// Malformed grammar text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error in grammar at {line}:{column}: {message}")]
pub struct GrammarSyntaxError {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub message: String,
}

impl GrammarSyntaxError {
    pub(crate) fn at(location: LineCol, message: impl Into<String>) -> Self {
        GrammarSyntaxError {
            line: location.line,
            column: location.column,
            offset: location.offset,
            message: message.into(),
        }
    }
}

impl From<ParseFailure<LineCol>> for GrammarSyntaxError {
    fn from(failure: ParseFailure<LineCol>) -> Self {
        GrammarSyntaxError::at(failure.location, format!("expected {}", failure.expected))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedRule {
    pub name: String,
    /// The rule whose body contains the reference.
    pub referenced_from: String,
    pub location: Option<LineCol>,
}

impl fmt::Display for UndefinedRule {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "`{}` (referenced from `{}`)", self.name, self.referenced_from)
    }
}

/// Every rule reference that names no rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedRuleError {
    pub rules: Vec<UndefinedRule>,
}

impl UndefinedRuleError {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }
}

impl fmt::Display for UndefinedRuleError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("undefined rules: ")?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                fmt.write_str(", ")?;
            }
            write!(fmt, "{}", rule)?;
        }
        Ok(())
    }
}

impl std::error::Error for UndefinedRuleError {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rule `{0}`")]
pub struct UnknownRuleError(pub String);

/// Errors that prevent a grammar from being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] GrammarSyntaxError),

    #[error(transparent)]
    Undefined(#[from] UndefinedRuleError),

    #[error("duplicate rule `{name}`")]
    DuplicateRule { name: String, location: Option<LineCol> },

    #[error("`%whitespace` must not reference itself: {}", .path.join(" -> "))]
    RecursiveWhitespace { path: Vec<String> },

    #[error("grammar defines no rules")]
    NoRules,

    #[error(transparent)]
    UnknownRule(#[from] UnknownRuleError),
}

impl CompileError {
    /// Where in the grammar source the error was found, if known.
    pub fn location(&self) -> Option<LineCol> {
        match self {
            CompileError::Syntax(e) => Some(LineCol {
                line: e.line,
                column: e.column,
                offset: e.offset,
            }),
            CompileError::Undefined(e) => e.rules.iter().find_map(|r| r.location),
            CompileError::DuplicateRule { location, .. } => *location,
            CompileError::RecursiveWhitespace { .. } | CompileError::NoRules | CompileError::UnknownRule(_) => None,
        }
    }
}

/// A semantic action returned an error; the parse was abandoned.
#[derive(Debug, Error)]
#[error("action for rule `{rule}` failed at {location}: {source}")]
pub struct ActionError {
    pub rule: String,
    pub location: LineCol,
    pub source: BoxError,
}

/// Rule nesting exceeded the configured stack limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stack overflow: more than {limit} nested rules at {location}")]
pub struct StackOverflowError {
    pub limit: usize,
    pub location: LineCol,
}

/// Errors that abort a parse call. An input that simply does not match is
/// not an error; see `ParseResult::Failed`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    StackOverflow(#[from] StackOverflowError),

    #[error(transparent)]
    UnknownRule(#[from] UnknownRuleError),
}
