//! Arena-backed forest of word nodes.

use std::collections::HashSet;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::domain::entities::WordItem;

/// Handle of a node inside one [`Forest`].
///
/// Handles are generational: once a node is removed its handle never resolves
/// again, even if the arena slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "NodeId({slot}:{generation})")
    }
}

/// Tree node in the arena-based forest.
#[derive(Debug, Clone)]
pub struct WordNode {
    /// Stable identifier, persisted with the session
    pub key: Uuid,
    /// The word itself
    pub name: String,
    /// Parent node, None for roots
    pub parent: Option<NodeId>,
    /// Ordered children
    pub children: Vec<NodeId>,
}

impl fmt::Display for WordNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Ordered forest of word trees.
///
/// Parent links are stored on every node and are only changed together with
/// the children list they mirror, so `parent` and `children` never disagree.
#[derive(Debug, Clone)]
pub struct Forest {
    pub(crate) arena: Arena<WordNode>,
    pub(crate) roots: Vec<NodeId>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    /// Rebuild a forest from a stored snapshot, keeping the stored keys.
    ///
    /// Missing or repeated keys are replaced by fresh ones so keys stay unique.
    #[instrument(level = "debug", skip(items), fields(roots = items.len()))]
    pub fn from_items(items: &[WordItem]) -> Self {
        let mut forest = Self::new();
        let mut seen = HashSet::new();
        for item in items {
            forest.insert_item(item, None, &mut |stored| match stored {
                Some(key) if seen.insert(key) => key,
                Some(key) => {
                    warn!("duplicate node key {key} in snapshot, assigning a new one");
                    fresh_key(&mut seen)
                }
                None => fresh_key(&mut seen),
            });
        }
        forest
    }

    /// Build a forest from foreign data: every incoming id is ignored.
    #[instrument(level = "debug", skip(items), fields(roots = items.len()))]
    pub fn from_foreign_items(items: &[WordItem]) -> Self {
        let mut forest = Self::new();
        let mut seen = HashSet::new();
        for item in items {
            forest.insert_item(item, None, &mut |_| fresh_key(&mut seen));
        }
        forest
    }

    fn insert_item(
        &mut self,
        item: &WordItem,
        parent: Option<NodeId>,
        key_for: &mut dyn FnMut(Option<Uuid>) -> Uuid,
    ) {
        let key = key_for(item.id);
        let idx = self.insert_node(key, item.name.clone(), parent);
        for child in &item.items {
            self.insert_item(child, Some(idx), key_for);
        }
    }

    /// Deep copy of the forest as nested items, ids included.
    pub fn snapshot(&self) -> Vec<WordItem> {
        self.roots.iter().filter_map(|&root| self.item_of(root)).collect()
    }

    fn item_of(&self, idx: NodeId) -> Option<WordItem> {
        let node = self.get(idx)?;
        Some(WordItem {
            id: Some(node.key),
            name: node.name.clone(),
            items: node
                .children
                .iter()
                .filter_map(|&child| self.item_of(child))
                .collect(),
        })
    }

    /// Append a node under `parent`, or as the last root.
    ///
    /// Callers must pass a parent that is present in the forest.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn insert_node(&mut self, key: Uuid, name: String, parent: Option<NodeId>) -> NodeId {
        let node = WordNode {
            key,
            name,
            parent,
            children: Vec::new(),
        };
        let idx = NodeId(self.arena.insert(node));

        match parent.and_then(|p| self.arena.get_mut(p.0)) {
            Some(parent) => parent.children.push(idx),
            None => {
                if let Some(node) = self.arena.get_mut(idx.0) {
                    node.parent = None;
                }
                self.roots.push(idx);
            }
        }
        idx
    }

    /// Take a node out of its container (parent children or roots).
    ///
    /// The node stays in the arena as a detached root; it must be attached or
    /// dropped before control returns to the caller of the mutation.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn detach(&mut self, idx: NodeId) {
        let parent = self.get(idx).and_then(|n| n.parent);
        let container = match parent.and_then(|p| self.arena.get_mut(p.0)) {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        container.retain(|&c| c != idx);
        if let Some(node) = self.arena.get_mut(idx.0) {
            node.parent = None;
        }
    }

    /// Append a detached node as last child of `parent`, or as last root.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn attach(&mut self, idx: NodeId, parent: Option<NodeId>) {
        match parent.and_then(|p| self.arena.get_mut(p.0)) {
            Some(parent_node) => {
                parent_node.children.push(idx);
                if let Some(node) = self.arena.get_mut(idx.0) {
                    node.parent = parent;
                }
            }
            None => self.roots.push(idx),
        }
    }

    /// Detach a node and free it together with its whole subtree.
    ///
    /// Descendants are freed before their ancestors.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove_subtree(&mut self, idx: NodeId) -> usize {
        let doomed: Vec<NodeId> = self.subtree_postorder(idx).map(|(id, _)| id).collect();
        self.detach(idx);
        let mut removed = 0;
        for id in doomed {
            if self.arena.remove(id.0).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub(crate) fn get_mut(&mut self, idx: NodeId) -> Option<&mut WordNode> {
        self.arena.get_mut(idx.0)
    }

    pub fn get(&self, idx: NodeId) -> Option<&WordNode> {
        self.arena.get(idx.0)
    }

    pub fn contains(&self, idx: NodeId) -> bool {
        self.arena.contains(idx.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of a node, empty for unknown nodes.
    pub fn children(&self, idx: NodeId) -> &[NodeId] {
        self.get(idx).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn name(&self, idx: NodeId) -> Option<&str> {
        self.get(idx).map(|n| n.name.as_str())
    }

    pub fn key_of(&self, idx: NodeId) -> Option<Uuid> {
        self.get(idx).map(|n| n.key)
    }

    /// Total number of nodes in all trees.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order traversal: roots in order, children left to right.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    /// Post-order traversal: every node after all of its descendants.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, &self.roots)
    }

    /// Post-order traversal of the subtree rooted at `idx`.
    pub fn subtree_postorder(&self, idx: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, &[idx])
    }

    /// Number of levels of the deepest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, idx: NodeId) -> usize {
        match self.get(idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Names of all nodes without children, in pre-order.
    pub fn leaf_names(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.name.clone())
            .collect()
    }
}

fn fresh_key(seen: &mut HashSet<Uuid>) -> Uuid {
    loop {
        let key = Uuid::new_v4();
        if seen.insert(key) {
            return key;
        }
    }
}

pub struct ForestIterator<'a> {
    forest: &'a Forest,
    stack: Vec<NodeId>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (NodeId, &'a WordNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.forest.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a Forest,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a Forest, starts: &[NodeId]) -> Self {
        let stack = starts.iter().rev().map(|&r| (r, false)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a WordNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get(current) {
                if visited {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
