use std::fmt::Display;

pub mod error;
pub mod str;

/// The result type used internally in the parser.
///
/// You'll only need this if driving the engine over a custom input type. The
/// public API of a parser adapts results to `pegrat::ParseResult`.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug, Hash)]
pub enum RuleResult<T> {
    Matched(usize, T),
    Failed,
}

impl<T> RuleResult<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, RuleResult::Matched(..))
    }
}

/// A type that can be used as input to a parser.
pub trait Parse {
    type PositionRepr: Display;
    fn start(&self) -> usize;
    fn is_eof(&self, p: usize) -> bool;
    fn position_repr(&self, p: usize) -> Self::PositionRepr;
}

/// A parser input type supporting character classes and `.`.
pub trait ParseElem: Parse {
    /// Type of a single atomic element of the input, for example a character
    type Element;

    /// Get the element at `pos`, or `Failed` if past end of input.
    fn parse_elem(&self, pos: usize) -> RuleResult<Self::Element>;
}

/// A parser input type supporting quoted literals.
pub trait ParseLiteral: Parse {
    /// Attempt to match the `literal` string at `pos`, returning whether it
    /// matched or failed.
    fn parse_string_literal(&self, pos: usize, literal: &str) -> RuleResult<()>;

    /// Like `parse_string_literal`, ignoring ASCII case.
    fn parse_string_literal_ignore_case(&self, pos: usize, literal: &str) -> RuleResult<()>;
}

/// A parser input type that can hand out the text a rule matched.
pub trait ParseSlice<'input>: Parse {
    /// Type of a slice of the input.
    type Slice;

    /// Get a slice of input.
    fn parse_slice(&'input self, p1: usize, p2: usize) -> Self::Slice;
}
