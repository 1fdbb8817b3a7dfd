use std::collections::{HashMap, HashSet};

use crate::ast::{Expr, RuleId};
use crate::error::{UndefinedRule, UndefinedRuleError};
use crate::grammar::Rule;

/// Point every rule reference at its rule, collecting all names that have no
/// definition.
pub(crate) fn resolve_refs(rules: &mut [Rule], index: &HashMap<String, RuleId>) -> Result<(), UndefinedRuleError> {
    let mut undefined = Vec::new();

    for Rule { name: rule_name, expr, location, .. } in rules.iter_mut() {
        resolve_expr(expr, index, &mut |name| {
            undefined.push(UndefinedRule {
                name: name.to_owned(),
                referenced_from: rule_name.clone(),
                location: *location,
            })
        });
    }

    if undefined.is_empty() {
        Ok(())
    } else {
        Err(UndefinedRuleError { rules: undefined })
    }
}

fn resolve_expr(expr: &mut Expr, index: &HashMap<String, RuleId>, undefined: &mut impl FnMut(&str)) {
    if let Expr::RuleRef(r) = expr {
        match index.get(&r.name) {
            Some(&id) => r.id = id,
            None => undefined(&r.name),
        }
        return;
    }

    for child in expr.children_mut() {
        resolve_expr(child, index, undefined);
    }
}

/// Which rules can be reached by following references from `roots`.
pub(crate) fn reachable(rules: &[Rule], roots: &[RuleId]) -> Vec<bool> {
    let mut seen = vec![false; rules.len()];
    let mut stack = roots.to_vec();

    while let Some(id) = stack.pop() {
        if std::mem::replace(&mut seen[id.index()], true) {
            continue;
        }
        rules[id.index()].expr.visit_refs(&mut |r| {
            if !seen[r.id.index()] {
                stack.push(r.id);
            }
        });
    }

    seen
}

/// A chain of references leading from `rule` back to itself, if there is one.
pub(crate) fn self_reference(rules: &[Rule], rule: RuleId) -> Option<Vec<String>> {
    fn walk(rules: &[Rule], target: RuleId, current: RuleId, path: &mut Vec<RuleId>, visited: &mut [bool]) -> bool {
        let mut refs = Vec::new();
        rules[current.index()].expr.visit_refs(&mut |r| refs.push(r.id));

        for next in refs {
            if next == target {
                path.push(next);
                return true;
            }
            if std::mem::replace(&mut visited[next.index()], true) {
                continue;
            }
            path.push(next);
            if walk(rules, target, next, path, visited) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = vec![rule];
    let mut visited = vec![false; rules.len()];
    if walk(rules, rule, rule, &mut path, &mut visited) {
        Some(path.iter().map(|id| rules[id.index()].name.clone()).collect())
    } else {
        None
    }
}

/// Find the cycles of rules that can call themselves without consuming input.
///
/// Each cycle is reported once, starting from its earliest-defined rule.
pub(crate) fn left_recursion(rules: &[Rule]) -> Vec<Vec<RuleId>> {
    let mut visitor = RecursionVisitor {
        rules,
        stack: Vec::new(),
        done: vec![None; rules.len()],
        lowest: usize::MAX,
        cycles: Vec::new(),
        reported: HashSet::new(),
    };

    for i in 0..rules.len() {
        visitor.walk_rule(RuleId(i));
        debug_assert!(visitor.stack.is_empty());
    }

    visitor.cycles
}

struct RecursionVisitor<'a> {
    rules: &'a [Rule],
    stack: Vec<RuleId>,
    /// Results for rules whose walk completed without reaching a rule
    /// further up the stack.
    done: Vec<Option<RuleInfo>>,
    /// Lowest stack index referenced by the walk in progress.
    lowest: usize,
    cycles: Vec<Vec<RuleId>>,
    reported: HashSet<Vec<RuleId>>,
}

#[derive(Clone, Copy)]
struct RuleInfo {
    /// Whether the rule can succeed without consuming input. A reference
    /// that closes a cycle counts as consuming.
    nullable: bool,
}

impl<'a> RecursionVisitor<'a> {
    fn walk_rule(&mut self, id: RuleId) -> RuleInfo {
        if let Some(info) = self.done[id.index()] {
            return info;
        }

        let rules = self.rules;
        let depth = self.stack.len();
        let outer = std::mem::replace(&mut self.lowest, usize::MAX);

        self.stack.push(id);
        let res = self.walk_expr(&rules[id.index()].expr);
        self.stack.pop();

        // A rule on a cycle through its callers is walked again from each
        // caller, so every cycle it closes is found.
        if self.lowest >= depth {
            self.done[id.index()] = Some(res);
        }
        self.lowest = self.lowest.min(outer);
        res
    }

    fn report(&mut self, mut cycle: Vec<RuleId>) {
        if let Some(first) = cycle.iter().enumerate().min_by_key(|(_, id)| **id).map(|(i, _)| i) {
            cycle.rotate_left(first);
        }
        if self.reported.insert(cycle.clone()) {
            self.cycles.push(cycle);
        }
    }

    fn walk_expr(&mut self, this_expr: &'a Expr) -> RuleInfo {
        match this_expr {
            Expr::RuleRef(r) => {
                if let Some(loop_start) = self.stack.iter().position(|&caller| caller == r.id) {
                    let cycle = self.stack[loop_start..].to_vec();
                    self.report(cycle);
                    self.lowest = self.lowest.min(loop_start);
                    return RuleInfo { nullable: false };
                }

                self.walk_rule(r.id)
            }
            Expr::Sequence(elems) => {
                for elem in elems {
                    if !self.walk_expr(elem).nullable {
                        return RuleInfo { nullable: false };
                    }
                }

                RuleInfo { nullable: true }
            }
            Expr::Choice(choices) => {
                let mut nullable = false;

                for expr in choices {
                    nullable |= self.walk_expr(expr).nullable;
                }

                RuleInfo { nullable }
            }

            Expr::ZeroOrMore(expr) | Expr::Optional(expr) | Expr::And(expr) | Expr::Not(expr) => {
                self.walk_expr(expr);
                RuleInfo { nullable: true }
            }

            Expr::OneOrMore(expr) => self.walk_expr(expr),

            Expr::Literal(lit) => RuleInfo {
                nullable: lit.text.is_empty(),
            },
            Expr::Class(_) | Expr::AnyChar => RuleInfo { nullable: false },
            Expr::EndOfInput => RuleInfo { nullable: true },
        }
    }
}
