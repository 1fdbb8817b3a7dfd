use std::collections::HashMap;

use pegrat_runtime::RuleResult;

use crate::ast::RuleId;

#[derive(Debug, Clone)]
pub(crate) enum MemoEntry<V> {
    /// The rule is being evaluated at this position further up the stack.
    InProgress,
    Matched(usize, Option<V>),
    Failed,
}

/// Results of rule invocations within one parse call, keyed by rule and
/// position.
///
/// With packrat disabled only the `InProgress` markers are kept, so that a
/// left-recursive rule still fails instead of recursing forever.
#[derive(Debug)]
pub(crate) struct MemoTable<V> {
    rules: Vec<HashMap<usize, MemoEntry<V>>>,
    packrat: bool,
}

impl<V: Clone> MemoTable<V> {
    pub fn new(rule_count: usize, packrat: bool) -> Self {
        MemoTable {
            rules: (0..rule_count).map(|_| HashMap::new()).collect(),
            packrat,
        }
    }

    pub fn get(&self, rule: RuleId, pos: usize) -> Option<&MemoEntry<V>> {
        self.rules[rule.index()].get(&pos)
    }

    pub fn begin(&mut self, rule: RuleId, pos: usize) {
        let prev = self.rules[rule.index()].insert(pos, MemoEntry::InProgress);
        debug_assert!(prev.is_none(), "rule {:?} re-entered at {}", rule, pos);
    }

    pub fn finish(&mut self, rule: RuleId, pos: usize, result: &RuleResult<Option<V>>) {
        let cache = &mut self.rules[rule.index()];
        if !self.packrat {
            cache.remove(&pos);
            return;
        }

        if let Some(entry) = cache.get_mut(&pos) {
            debug_assert!(matches!(entry, MemoEntry::InProgress), "memo entry overwritten");
            *entry = match result {
                RuleResult::Matched(end, value) => MemoEntry::Matched(*end, value.clone()),
                RuleResult::Failed => MemoEntry::Failed,
            };
        }
    }

    pub fn clear(&mut self) {
        for cache in &mut self.rules {
            cache.clear();
        }
    }
}
