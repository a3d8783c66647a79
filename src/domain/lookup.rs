//! Parent, ancestor and position queries over a forest.

use tracing::instrument;
use uuid::Uuid;

use crate::domain::arena::{Forest, NodeId};
use crate::domain::error::DomainError;

/// Prefix marking a node reference as a key prefix instead of a name path.
pub const KEY_REFERENCE_PREFIX: char = '#';

impl Forest {
    /// Immediate parent of `node`; None for roots and for absent nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn find_parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    /// True if `node` is reachable from `ancestor` through one or more
    /// child links. A node is not its own descendant.
    #[instrument(level = "trace", skip(self))]
    pub fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.contains(ancestor) {
            return false;
        }
        let mut current = self.find_parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.find_parent(parent);
        }
        false
    }

    /// The list `node` lives in: its parent's children, or the roots.
    pub fn siblings(&self, node: NodeId) -> &[NodeId] {
        match self.find_parent(node) {
            Some(parent) => self.children(parent),
            None => self.roots(),
        }
    }

    /// Position of `node` within its sibling list, -1 if absent.
    #[instrument(level = "trace", skip(self))]
    pub fn index_in_sibling_list(&self, node: NodeId) -> isize {
        if !self.contains(node) {
            return -1;
        }
        self.siblings(node)
            .iter()
            .position(|&n| n == node)
            .map_or(-1, |i| i as isize)
    }

    pub fn find_by_key(&self, key: Uuid) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.key == key).map(|(idx, _)| idx)
    }

    /// Resolve a user supplied node reference.
    ///
    /// `animal/mammal/dog` walks names from the roots, `#3fa2` matches the
    /// beginning of a node key.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, reference: &str) -> Result<NodeId, DomainError> {
        let reference = reference.trim();
        match reference.strip_prefix(KEY_REFERENCE_PREFIX) {
            Some(prefix) => self.resolve_key_prefix(reference, prefix),
            None => self.resolve_path(reference),
        }
    }

    fn resolve_key_prefix(&self, reference: &str, prefix: &str) -> Result<NodeId, DomainError> {
        let prefix = prefix.to_ascii_lowercase().replace('-', "");
        if prefix.is_empty() {
            return Err(DomainError::NodeNotFound(reference.to_string()));
        }
        let matches: Vec<NodeId> = self
            .iter()
            .filter(|(_, n)| n.key.simple().to_string().starts_with(&prefix))
            .map(|(idx, _)| idx)
            .collect();
        single(reference, matches)
    }

    fn resolve_path(&self, reference: &str) -> Result<NodeId, DomainError> {
        let mut candidates = self.roots();
        let mut found = None;
        for segment in reference.split('/') {
            let matches: Vec<NodeId> = candidates
                .iter()
                .copied()
                .filter(|&c| self.name(c) == Some(segment))
                .collect();
            let node = single(reference, matches)?;
            candidates = self.children(node);
            found = Some(node);
        }
        found.ok_or_else(|| DomainError::NodeNotFound(reference.to_string()))
    }
}

fn single(reference: &str, matches: Vec<NodeId>) -> Result<NodeId, DomainError> {
    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(DomainError::NodeNotFound(reference.to_string())),
        _ => Err(DomainError::AmbiguousNode {
            reference: reference.to_string(),
            matches: matches.len(),
        }),
    }
}
