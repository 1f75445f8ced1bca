use std::hash::Hash;

use fxhash::FxBuildHasher;
use indexmap::IndexMap;

use crate::env::DiscreteAction;

use super::ActionValues;

/// Lazily populated state -> action values table, iterated in first-visit order.
#[derive(Debug, Clone)]
pub struct QTable<S: Hash + Eq, A: DiscreteAction> {
    rows: IndexMap<S, ActionValues<A>, FxBuildHasher>,
}

impl<S: Hash + Eq, A: DiscreteAction> QTable<S, A> {
    pub fn new() -> Self {
        Self {
            rows: IndexMap::with_hasher(FxBuildHasher::default()),
        }
    }

    pub fn get(&self, state: &S) -> Option<&ActionValues<A>> {
        self.rows.get(state)
    }

    /// Row of `state`, created with every legal action at 0.0 on first visit.
    pub fn get_or_init(&mut self, state: S, legal_actions: &[A]) -> &mut ActionValues<A> {
        self.rows
            .entry(state)
            .or_insert_with(|| ActionValues::new(legal_actions))
    }

    pub fn contains(&self, state: &S) -> bool {
        self.rows.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &ActionValues<A>)> {
        self.rows.iter()
    }
}

impl<S: Hash + Eq, A: DiscreteAction> Default for QTable<S, A> {
    fn default() -> Self {
        Self::new()
    }
}
