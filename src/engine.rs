//! The packrat interpreter.
//!
//! A parse call walks the rule expressions directly. Rule invocations are
//! memoized by `(RuleId, position)`; values produced by rule references are
//! kept on a stack that is cut back whenever an alternative fails.

use std::sync::Arc;

use pegrat_runtime::error::ErrorState;
use pegrat_runtime::RuleResult::{self, Failed, Matched};
use pegrat_runtime::{Parse, ParseElem, ParseLiteral};

use crate::action::{Action, SemanticValues};
use crate::ast::{Expr, RuleId};
use crate::error::{ActionError, ParseError, StackOverflowError};
use crate::grammar::{Grammar, ParseOptions, Rule};
use crate::memo::{MemoEntry, MemoTable};
use crate::parser::ParseResult;

/// Remaining native stack below which a rule body runs on a fresh segment.
const RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated for deep rule nesting.
const STACK_PER_RECURSION: usize = 1024 * 1024;

pub(crate) fn parse<V: Clone>(
    grammar: &Grammar,
    actions: &[Option<Arc<Action<V>>>],
    start: RuleId,
    input: &str,
) -> Result<ParseResult<V>, ParseError> {
    let rule_name = &grammar.rules[start.index()].name;
    log::debug!("parsing {} bytes with rule `{}`", input.len(), rule_name);

    let mut state = ParseState::new(grammar, actions, input);

    if let Matched(consumed, value) = state.run(start)? {
        log::debug!("rule `{}` matched {} bytes", rule_name, consumed);
        return Ok(ParseResult::Matched { consumed, value });
    }

    state.reset();
    state.err.reparse_for_failure();

    if state.run(start)?.is_matched() {
        log::error!("rule `{}` matched when reparsing for error position", rule_name);
    }

    let failure = state.err.into_failure(input);
    log::debug!("rule `{}` failed: {}", rule_name, failure);
    Ok(ParseResult::Failed(failure))
}

/// Everything that lives for a single parse call.
pub(crate) struct ParseState<'g, 'i, V> {
    grammar: &'g Grammar,
    actions: &'g [Option<Arc<Action<V>>>],
    input: &'i str,
    options: ParseOptions,
    memo: MemoTable<V>,
    values: Vec<V>,
    err: ErrorState,
    depth: usize,
}

impl<'g, 'i, V: Clone> ParseState<'g, 'i, V> {
    fn new(grammar: &'g Grammar, actions: &'g [Option<Arc<Action<V>>>], input: &'i str) -> Self {
        let options = grammar.options;
        ParseState {
            grammar,
            actions,
            input,
            options,
            memo: MemoTable::new(grammar.rules.len(), options.packrat),
            values: Vec::new(),
            err: ErrorState::new(input.start()),
            depth: 0,
        }
    }

    fn reset(&mut self) {
        self.memo.clear();
        self.values.clear();
        self.depth = 0;
    }

    fn run(&mut self, start: RuleId) -> Result<RuleResult<Option<V>>, ParseError> {
        let pos = self.skip_whitespace(self.input.start())?;

        let (end, value) = match self.eval_rule(start, pos)? {
            Matched(end, value) => (end, value),
            Failed => return Ok(Failed),
        };

        if !self.options.eoi_check {
            return Ok(Matched(end, value));
        }

        let end = self.skip_whitespace(end)?;
        if self.input.is_eof(end) {
            Ok(Matched(end, value))
        } else {
            self.err.mark_failure(end, "EOF");
            Ok(Failed)
        }
    }

    /// Consume as many repetitions of `%whitespace` as match at `pos`.
    fn skip_whitespace(&mut self, pos: usize) -> Result<usize, ParseError> {
        let ws = match self.grammar.whitespace {
            Some(ws) => ws,
            None => return Ok(pos),
        };

        self.err.suppress_fail += 1;
        let res = self.repeat_whitespace(ws, pos);
        self.err.suppress_fail -= 1;
        res
    }

    fn repeat_whitespace(&mut self, ws: RuleId, mut pos: usize) -> Result<usize, ParseError> {
        loop {
            match self.eval_rule(ws, pos)? {
                Matched(next, _) if next > pos => pos = next,
                _ => return Ok(pos),
            }
        }
    }

    fn eval_rule(&mut self, id: RuleId, pos: usize) -> Result<RuleResult<Option<V>>, ParseError> {
        let grammar = self.grammar;
        let rule = &grammar.rules[id.index()];

        match self.memo.get(id, pos) {
            Some(MemoEntry::InProgress) => {
                if cfg!(feature = "trace") {
                    log::trace!("[PEG_TRACE] Left recursion in rule {} at {}", rule.name, self.input.position_repr(pos));
                }
                return Ok(Failed);
            }
            Some(MemoEntry::Matched(end, value)) => {
                if cfg!(feature = "trace") {
                    log::trace!("[PEG_TRACE] Cached match of rule {} at {}", rule.name, self.input.position_repr(pos));
                }
                return Ok(Matched(*end, value.clone()));
            }
            Some(MemoEntry::Failed) => {
                if cfg!(feature = "trace") {
                    log::trace!("[PEG_TRACE] Cached fail of rule {} at {}", rule.name, self.input.position_repr(pos));
                }
                return Ok(Failed);
            }
            None => {}
        }

        if self.depth >= self.options.stack_limit {
            return Err(StackOverflowError {
                limit: self.options.stack_limit,
                location: self.input.position_repr(pos),
            }
            .into());
        }

        if cfg!(feature = "trace") {
            log::trace!("[PEG_TRACE] Attempting to match rule {} at {}", rule.name, self.input.position_repr(pos));
        }

        self.memo.begin(id, pos);
        self.depth += 1;
        let mark = self.values.len();
        // Nesting is bounded by `stack_limit`, not by the native stack.
        let body = stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || {
            self.eval(&rule.expr, pos, rule.skip_whitespace)
        });
        self.depth -= 1;

        let result = match body? {
            Matched(end, ()) => {
                let children = self.values.split_off(mark);
                Matched(end, self.reduce(id, rule, pos, end, children)?)
            }
            Failed => {
                self.values.truncate(mark);
                Failed
            }
        };

        if cfg!(feature = "trace") {
            match result {
                Matched(end, _) => log::trace!(
                    "[PEG_TRACE] Matched rule {} at {}:{}",
                    rule.name,
                    self.input.position_repr(pos),
                    self.input.position_repr(end)
                ),
                Failed => log::trace!("[PEG_TRACE] Failed to match rule {} at {}", rule.name, self.input.position_repr(pos)),
            }
        }

        self.memo.finish(id, pos, &result);
        Ok(result)
    }

    /// Turn the values matched inside a rule into the rule's value.
    fn reduce(&self, id: RuleId, rule: &Rule, start: usize, end: usize, children: Vec<V>) -> Result<Option<V>, ParseError> {
        let action = match self.actions.get(id.index()).and_then(Option::as_ref) {
            Some(action) => action,
            None => return Ok(children.into_iter().next()),
        };

        let values = SemanticValues::new(self.input, start, end, children);
        match (**action)(values) {
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(ActionError {
                rule: rule.name.clone(),
                location: self.input.position_repr(start),
                source,
            }
            .into()),
        }
    }

    fn eval(&mut self, expr: &'g Expr, pos: usize, skip: bool) -> Result<RuleResult<()>, ParseError> {
        match expr {
            Expr::Literal(lit) => {
                let res = if lit.ignore_case {
                    self.input.parse_string_literal_ignore_case(pos, &lit.text)
                } else {
                    self.input.parse_string_literal(pos, &lit.text)
                };
                Ok(match res {
                    Matched(end, ()) => Matched(end, ()),
                    Failed => self.err.mark_failure(pos, lit),
                })
            }

            Expr::Class(class) => Ok(match self.input.parse_elem(pos) {
                Matched(next, c) if class.matches(c) => Matched(next, ()),
                _ => self.err.mark_failure(pos, class),
            }),

            Expr::AnyChar => Ok(match self.input.parse_elem(pos) {
                Matched(next, _) => Matched(next, ()),
                Failed => self.err.mark_failure(pos, "any character"),
            }),

            Expr::EndOfInput => Ok(if self.input.is_eof(pos) {
                Matched(pos, ())
            } else {
                self.err.mark_failure(pos, "EOF")
            }),

            Expr::Sequence(elems) => {
                let mark = self.values.len();
                let mut cur = pos;
                for (i, elem) in elems.iter().enumerate() {
                    if skip && i > 0 {
                        cur = self.skip_whitespace(cur)?;
                    }
                    match self.eval(elem, cur, skip)? {
                        Matched(next, ()) => cur = next,
                        Failed => {
                            self.values.truncate(mark);
                            return Ok(Failed);
                        }
                    }
                }
                Ok(Matched(cur, ()))
            }

            Expr::Choice(alternatives) => {
                let mark = self.values.len();
                for alt in alternatives {
                    if let Matched(end, ()) = self.eval(alt, pos, skip)? {
                        return Ok(Matched(end, ()));
                    }
                    self.values.truncate(mark);
                }
                Ok(Failed)
            }

            Expr::ZeroOrMore(inner) => {
                let (end, _) = self.repeat(inner, pos, skip)?;
                Ok(Matched(end, ()))
            }

            Expr::OneOrMore(inner) => {
                let (end, count) = self.repeat(inner, pos, skip)?;
                Ok(if count > 0 { Matched(end, ()) } else { Failed })
            }

            Expr::Optional(inner) => {
                let mark = self.values.len();
                match self.eval(inner, pos, skip)? {
                    Matched(end, ()) => Ok(Matched(end, ())),
                    Failed => {
                        self.values.truncate(mark);
                        Ok(Matched(pos, ()))
                    }
                }
            }

            Expr::And(inner) => Ok(if self.lookahead(inner, pos, skip)? {
                Matched(pos, ())
            } else {
                self.err.mark_failure(pos, expr)
            }),

            Expr::Not(inner) => Ok(if self.lookahead(inner, pos, skip)? {
                self.err.mark_failure(pos, expr)
            } else {
                Matched(pos, ())
            }),

            Expr::RuleRef(r) => Ok(match self.eval_rule(r.id, pos)? {
                Matched(end, value) => {
                    self.values.extend(value);
                    Matched(end, ())
                }
                Failed => Failed,
            }),
        }
    }

    /// Match `inner` as many times as possible. Returns the end position and
    /// the number of iterations.
    ///
    /// An iteration that consumes nothing ends the loop, since repeating it
    /// would match the same way forever.
    fn repeat(&mut self, inner: &'g Expr, pos: usize, skip: bool) -> Result<(usize, usize), ParseError> {
        let mut cur = pos;
        let mut count = 0;

        loop {
            let mark = self.values.len();
            let start = if skip && count > 0 {
                self.skip_whitespace(cur)?
            } else {
                cur
            };

            match self.eval(inner, start, skip)? {
                Matched(next, ()) if next > start => {
                    cur = next;
                    count += 1;
                }
                Matched(..) => {
                    count += 1;
                    break;
                }
                Failed => {
                    self.values.truncate(mark);
                    break;
                }
            }
        }

        Ok((cur, count))
    }

    /// Evaluate a predicate operand without consuming input or keeping its
    /// values. Failures inside it are not reported.
    fn lookahead(&mut self, inner: &'g Expr, pos: usize, skip: bool) -> Result<bool, ParseError> {
        let mark = self.values.len();
        self.err.suppress_fail += 1;
        let res = self.eval(inner, pos, skip);
        self.err.suppress_fail -= 1;
        self.values.truncate(mark);
        Ok(res?.is_matched())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    fn grammar(rules: &[(&str, Expr)]) -> Grammar {
        rules
            .iter()
            .cloned()
            .fold(GrammarBuilder::new(), |b, (name, expr)| b.rule(name, expr))
            .build()
            .unwrap()
    }

    #[test]
    fn memo_is_dropped_between_calls() {
        let g = grammar(&[("s", Expr::one_or_more(Expr::literal("a")))]);
        assert!(g.parse("aaa").unwrap().is_matched());
        assert!(!g.parse("aab").unwrap().is_matched());
        assert!(g.parse("a").unwrap().is_matched());
    }

    #[test]
    fn values_from_failed_alternatives_are_discarded() {
        let mut parser = crate::Parser::<String>::new(grammar(&[
            (
                "s",
                Expr::choice([
                    Expr::seq([Expr::rule_ref("a"), Expr::literal("!")]),
                    Expr::seq([Expr::rule_ref("a"), Expr::rule_ref("b")]),
                ]),
            ),
            ("a", Expr::literal("a")),
            ("b", Expr::literal("b")),
        ]));
        parser
            .set_action("s", |sv| Ok(sv.values().join(",")))
            .unwrap()
            .set_action("a", |sv| Ok(sv.text().to_owned()))
            .unwrap()
            .set_action("b", |sv| Ok(sv.text().to_owned()))
            .unwrap();

        let value = parser.parse("ab").unwrap().into_value();
        assert_eq!(value.as_deref(), Some("a,b"));
    }

    #[test]
    fn optional_zero_width_repetition_counts_once() {
        let g = grammar(&[("s", Expr::seq([Expr::one_or_more(Expr::optional(Expr::literal("x"))), Expr::literal("y")]))]);
        assert!(g.parse("y").unwrap().is_matched());
        assert!(g.parse("xxy").unwrap().is_matched());
    }
}
