//! Owner of the live forest.

use tracing::debug;

use crate::domain::arena::Forest;
use crate::domain::entities::WordItem;
use crate::domain::mutation::Outcome;

/// Holds the forest being edited.
///
/// All edits go through [`NodeStore::apply`], one mutation at a time.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    forest: Forest,
}

impl NodeStore {
    pub fn new(forest: Forest) -> Self {
        Self { forest }
    }

    /// Rebuild the store from a stored snapshot.
    pub fn from_items(items: &[WordItem]) -> Self {
        Self::new(Forest::from_items(items))
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Swap in a whole new forest, returning the old one.
    pub fn replace_forest(&mut self, forest: Forest) -> Forest {
        debug!("replacing forest ({} -> {} nodes)", self.forest.len(), forest.len());
        std::mem::replace(&mut self.forest, forest)
    }

    /// Deep copy of the live forest.
    pub fn snapshot(&self) -> Vec<WordItem> {
        self.forest.snapshot()
    }

    /// Run one mutation against the live forest.
    pub fn apply<T>(&mut self, op: impl FnOnce(&mut Forest) -> Outcome<T>) -> Outcome<T> {
        let outcome = op(&mut self.forest);
        if let Some(reason) = outcome.rejection() {
            debug!("mutation rejected: {reason}");
        }
        outcome
    }
}
