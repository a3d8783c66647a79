//! Tree mutations with invariant checks.
//!
//! Every operation validates against the current forest before it changes
//! anything. A rejected operation leaves the forest exactly as it was, so a
//! caller never observes a half-applied move.

use std::fmt;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::arena::{Forest, NodeId};

/// Why a mutation was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Node name is empty
    EmptyName,
    /// A node passed in is not part of the forest
    UnknownNode,
    /// A node cannot become its own parent
    SelfTarget,
    /// The target lies below the dragged node
    CycleDetected,
    /// The node is a root already
    AlreadyRoot,
    /// The node is a direct child of the target already
    AlreadyChild,
    /// Dragged and target nodes do not share a parent
    NotSiblings,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Rejection::EmptyName => "name must not be empty",
            Rejection::UnknownNode => "node is not part of the tree",
            Rejection::SelfTarget => "a word cannot be placed inside itself",
            Rejection::CycleDetected => "target is below the moved word",
            Rejection::AlreadyRoot => "word is already on the first level",
            Rejection::AlreadyChild => "word is already a child of the target",
            Rejection::NotSiblings => "words do not share a parent",
        };
        f.write_str(msg)
    }
}

/// Result of a mutation. `Rejected` means nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T = ()> {
    Applied(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Rejected(reason) => Some(*reason),
        }
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// Drop the payload, keeping only applied/rejected.
    pub fn discard(self) -> Outcome {
        match self {
            Outcome::Applied(_) => Outcome::Applied(()),
            Outcome::Rejected(reason) => Outcome::Rejected(reason),
        }
    }
}

impl Forest {
    /// Create a word under `parent`, or as the last root.
    #[instrument(level = "debug", skip(self))]
    pub fn create_node(&mut self, name: &str, parent: Option<NodeId>) -> Outcome<NodeId> {
        if name.trim().is_empty() {
            debug!("create cancelled: empty name");
            return Outcome::Rejected(Rejection::EmptyName);
        }
        if parent.is_some_and(|p| !self.contains(p)) {
            return Outcome::Rejected(Rejection::UnknownNode);
        }
        let key = self.unused_key();
        let idx = self.insert_node(key, name.to_string(), parent);
        debug!("created {name} as {idx}");
        Outcome::Applied(idx)
    }

    fn unused_key(&self) -> Uuid {
        loop {
            let key = Uuid::new_v4();
            if self.find_by_key(key).is_none() {
                return key;
            }
        }
    }

    /// Remove a word and its whole subtree; children are not re-parented.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, node: NodeId) -> Outcome {
        if !self.contains(node) {
            return Outcome::Rejected(Rejection::UnknownNode);
        }
        let removed = self.remove_subtree(node);
        debug!("removed {node} with {} node(s)", removed);
        Outcome::Applied(())
    }

    /// Rename a word in place.
    #[instrument(level = "debug", skip(self))]
    pub fn rename_node(&mut self, node: NodeId, new_name: &str) -> Outcome {
        match self.get_mut(node) {
            Some(n) => {
                n.name = new_name.to_string();
                Outcome::Applied(())
            }
            None => Outcome::Rejected(Rejection::UnknownNode),
        }
    }

    /// Move `dragged` to the end of `target`'s children, or to the end of the
    /// roots when no target is given.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&mut self, dragged: NodeId, target: Option<NodeId>) -> Outcome {
        if let Some(reason) = self.check_move(dragged, target) {
            debug!("move cancelled: {reason}");
            return Outcome::Rejected(reason);
        }
        self.detach(dragged);
        self.attach(dragged, target);
        debug!("moved {dragged} to {target:?}");
        Outcome::Applied(())
    }

    fn check_move(&self, dragged: NodeId, target: Option<NodeId>) -> Option<Rejection> {
        if !self.contains(dragged) || target.is_some_and(|t| !self.contains(t)) {
            return Some(Rejection::UnknownNode);
        }
        match target {
            Some(t) if t == dragged => Some(Rejection::SelfTarget),
            Some(t) if self.is_descendant(dragged, t) => Some(Rejection::CycleDetected),
            None if self.find_parent(dragged).is_none() => Some(Rejection::AlreadyRoot),
            Some(t) if self.children(t).contains(&dragged) => Some(Rejection::AlreadyChild),
            _ => None,
        }
    }

    /// Shift a word by `index_offset` positions among its siblings.
    ///
    /// The target position is clamped to the sibling list. Returns
    /// `Applied(false)` when the clamped position equals the current one.
    #[instrument(level = "debug", skip(self))]
    pub fn order_node(&mut self, node: NodeId, index_offset: isize) -> Outcome<bool> {
        let index = self.index_in_sibling_list(node);
        if index < 0 {
            return Outcome::Rejected(Rejection::UnknownNode);
        }
        let last = self.siblings(node).len() as isize - 1;
        let new_index = index.saturating_add(index_offset).clamp(0, last);
        if new_index == index {
            return Outcome::Applied(false);
        }

        debug!("new index {index} => {new_index}");
        let list = match self.find_parent(node) {
            Some(parent) => match self.get_mut(parent) {
                Some(p) => &mut p.children,
                None => return Outcome::Rejected(Rejection::UnknownNode),
            },
            None => &mut self.roots,
        };
        let moved = list.remove(index as usize);
        list.insert(new_index as usize, moved);
        Outcome::Applied(true)
    }

    /// Reorder `dragged` relative to a sibling it was dropped on.
    ///
    /// Dragging upwards moves by `target_index - dragged_index`; any other
    /// direction moves by `dragged_index + target_index`. The downward
    /// formula is not symmetric with the upward one and overshoots for most
    /// layouts; clamping in [`Forest::order_node`] bounds the result.
    #[instrument(level = "debug", skip(self))]
    pub fn reparent_by_switch(
        &mut self,
        pointer_delta_y: f64,
        dragged: NodeId,
        target: NodeId,
    ) -> Outcome<bool> {
        if self.find_parent(dragged) != self.find_parent(target) {
            debug!("switch cancelled: different parents");
            return Outcome::Rejected(Rejection::NotSiblings);
        }
        let dragged_index = self.index_in_sibling_list(dragged);
        let target_index = self.index_in_sibling_list(target);
        debug!(dragged_index, target_index, "switch");

        let offset = if pointer_delta_y < 0.0 {
            target_index - dragged_index
        } else {
            dragged_index + target_index
        };
        self.order_node(dragged, offset)
    }
}
