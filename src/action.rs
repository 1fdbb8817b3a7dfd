//! Semantic actions: callbacks that turn a rule match into a value.

use std::ops::Index;
use std::sync::Arc;

use pegrat_runtime::str::LineCol;
use pegrat_runtime::{Parse, ParseSlice};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A semantic action attached to a rule.
pub type Action<V> = dyn Fn(SemanticValues<'_, V>) -> Result<V, BoxError> + Send + Sync;

pub(crate) type ActionTable<V> = Vec<Option<Arc<Action<V>>>>;

/// What an action gets to see about the match it is called for.
#[derive(Debug)]
pub struct SemanticValues<'input, V> {
    input: &'input str,
    start: usize,
    end: usize,
    values: Vec<V>,
}

impl<'input, V> SemanticValues<'input, V> {
    pub(crate) fn new(input: &'input str, start: usize, end: usize, values: Vec<V>) -> Self {
        SemanticValues {
            input,
            start,
            end,
            values,
        }
    }

    /// The text consumed by the rule.
    pub fn text(&self) -> &'input str {
        self.input.parse_slice(self.start, self.end)
    }

    /// Byte offset of the match in the input.
    pub fn offset(&self) -> usize {
        self.start
    }

    pub fn line_info(&self) -> LineCol {
        self.input.position_repr(self.start)
    }

    /// Values produced by the rules matched inside this one, in order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&V> {
        self.values.get(i)
    }
}

impl<'input, V> Index<usize> for SemanticValues<'input, V> {
    type Output = V;

    fn index(&self, i: usize) -> &V {
        &self.values[i]
    }
}

impl<'input, V> IntoIterator for SemanticValues<'input, V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
