//! Parse error reporting

use crate::{Parse, RuleResult};
use std::collections::BTreeSet;
use std::fmt::{self, Debug, Display};

/// A set of literals or names that failed to match
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ExpectedSet {
    expected: BTreeSet<String>,
}

impl ExpectedSet {
    /// Iterator of expected literals, in sorted order
    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.expected.iter().map(|x| x.as_str())
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.expected.contains(token)
    }
}

impl Display for ExpectedSet {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let mut iter = self.tokens();
        match (iter.next(), self.expected.len()) {
            (None, _) => write!(fmt, "<unreported>")?,
            (Some(only), 1) => write!(fmt, "{}", only)?,
            (Some(first), _) => {
                write!(fmt, "one of {}", first)?;
                for elem in iter {
                    write!(fmt, ", {}", elem)?;
                }
            }
        }

        Ok(())
    }
}

/// A parse failure.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ParseFailure<L> {
    /// The furthest position the parser reached in the input before failing.
    pub location: L,

    /// The set of literals that failed to match at that position.
    pub expected: ExpectedSet,
}

impl<L: Display> Display for ParseFailure<L> {
    fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::result::Result<(), ::std::fmt::Error> {
        write!(fmt, "error at {}: expected {}", self.location, self.expected)
    }
}

impl<L: Display + Debug> ::std::error::Error for ParseFailure<L> {}

#[doc(hidden)]
#[derive(Debug)]
pub struct ErrorState {
    /// Furthest failure we've hit so far.
    pub max_err_pos: usize,

    /// Are we inside a lookahead or whitespace skip? If so, failures are not recorded.
    /// Non-zero => yes, to support nested blocks.
    pub suppress_fail: usize,

    /// Are we reparsing after a failure? If so, compute and store expected set of all alternative expectations
    /// when we are at offset `max_err_pos`.
    pub reparsing_on_failure: bool,

    /// The set of tokens we expected to find when we hit the failure. Updated when `reparsing_on_failure`.
    pub expected: ExpectedSet,
}

impl ErrorState {
    pub fn new(initial_pos: usize) -> Self {
        ErrorState {
            max_err_pos: initial_pos,
            suppress_fail: 0,
            reparsing_on_failure: false,
            expected: ExpectedSet::default(),
        }
    }

    /// Set up for reparsing to record the details of the furthest failure.
    pub fn reparse_for_failure(&mut self) {
        self.suppress_fail = 0;
        self.reparsing_on_failure = true;
    }

    #[inline(never)]
    fn mark_failure_slow_path<E: Display + ?Sized>(&mut self, pos: usize, expected: &E) {
        if pos == self.max_err_pos {
            self.expected.expected.insert(expected.to_string());
        }
    }

    /// Flag a failure.
    #[inline(always)]
    pub fn mark_failure<E: Display + ?Sized>(&mut self, pos: usize, expected: &E) -> RuleResult<()> {
        if self.suppress_fail == 0 {
            if self.reparsing_on_failure {
                self.mark_failure_slow_path(pos, expected);
            } else if pos > self.max_err_pos {
                self.max_err_pos = pos;
            }
        }
        RuleResult::Failed
    }

    /// Build the failure report for `input`.
    pub fn into_failure<I: Parse + ?Sized>(self, input: &I) -> ParseFailure<I::PositionRepr> {
        ParseFailure {
            location: input.position_repr(self.max_err_pos),
            expected: self.expected,
        }
    }
}
