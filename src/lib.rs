//! `pegrat` parses text with [Parsing Expression Grammars] that are compiled
//! at runtime, memoizing rule results so that backtracking stays linear in
//! the input.
//!
//! [Parsing Expression Grammars]: https://en.wikipedia.org/wiki/Parsing_expression_grammar
//!
//! ## Grammar syntax
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `Name <- e` | Define rule `Name`. The first rule defined is the start rule. |
//! | `'abc'`, `"abc"` | Match a literal string. A trailing `i` (`'abc'i`) ignores ASCII case. |
//! | `[a-z_]`, `[^0-9]` | Match one character in (or not in) a set of ranges. |
//! | `.` | Match any single character. |
//! | `e1 e2` | Match `e1` then `e2`. |
//! | `e1 / e2` | Try `e1`; if it fails, try `e2` from the same position. |
//! | `e*`, `e+`, `e?` | Zero or more, one or more, optional. |
//! | `&e`, `!e` | Succeed if `e` matches (does not match), consuming nothing. |
//! | `!.` | Match the end of input. |
//! | `( e )` | Grouping. |
//! | `# ...` | Comment until end of line. |
//!
//! Literals and classes accept the escapes `\n \r \t \0 \' \" \[ \] \\ \^ \-`,
//! `\xHH` and `\u{HHHH}`.
//!
//! ## Whitespace
//!
//! A rule named `%whitespace` is skipped before the start rule, after it, and
//! between the elements of every sequence and repetition in the other rules.
//! Rules written in all caps, rules that reference no other rule, and rules
//! used by `%whitespace` are tokens: whitespace is never skipped inside them.
//!
//! ```
//! let grammar = pegrat::compile(r"
//!     Start <- 'Catgirl' End
//!     End   <- !.
//!     %whitespace <- [ \t\r\n]*
//! ").unwrap();
//!
//! assert!(grammar.parse("\n\t Catgirl \r\n").unwrap().is_matched());
//! assert!(!grammar.parse("Catgirl meow").unwrap().is_matched());
//! ```
//!
//! ## Values
//!
//! A [`Parser`] attaches semantic actions to rules. An action receives the
//! text the rule matched and the values of the rules matched inside it, and
//! returns the rule's value. Rules without an action pass on the value of
//! their first child.
//!
//! ## Left recursion
//!
//! Rules that can call themselves without consuming input are reported as
//! warnings. At parse time the inner invocation simply fails, so such a rule
//! matches only through its non-recursive alternatives.

pub use pegrat_runtime as runtime;
pub use pegrat_runtime::error::{ExpectedSet, ParseFailure};
pub use pegrat_runtime::str::LineCol;
pub use pegrat_runtime::RuleResult;

mod action;
mod analysis;
pub mod ast;
mod compiler;
pub mod diagnostics;
mod engine;
pub mod error;
mod grammar;
mod memo;
mod meta;
mod parser;


pub use action::{Action, BoxError, SemanticValues};
pub use ast::{Expr, RuleId};
pub use compiler::compile;
pub use diagnostics::{compile_with_report, Report};
pub use error::{CompileError, ParseError};
pub use grammar::{Grammar, GrammarBuilder, ParseOptions, Rule, Warning, WarningKind, WHITESPACE_RULE};
pub use parser::{ParseResult, Parser};
