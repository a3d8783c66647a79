//! Text rendering of the forest with termtree.

use termtree::Tree;

use crate::domain::arena::{Forest, NodeId};
use crate::domain::entities::short_id;

/// How much of the forest to draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Deepest level to draw (1 = first level only), None for everything
    pub max_depth: Option<usize>,
    /// Append the short node key to every label
    pub show_ids: bool,
}

pub trait TreeRender {
    fn to_trees(&self, options: &RenderOptions) -> Vec<Tree<String>>;
}

impl TreeRender for Forest {
    fn to_trees(&self, options: &RenderOptions) -> Vec<Tree<String>> {
        fn build(forest: &Forest, idx: NodeId, level: usize, options: &RenderOptions) -> Tree<String> {
            let children = forest.children(idx);
            let mut label = forest.name(idx).unwrap_or_default().to_string();
            if options.show_ids {
                if let Some(key) = forest.key_of(idx) {
                    label = format!("{label} [{}]", short_id(&key));
                }
            }

            let expanded = options.max_depth.map_or(true, |max| level < max);
            if !expanded {
                if !children.is_empty() {
                    label = format!("{label} (+{})", children.len());
                }
                return Tree::new(label);
            }

            let leaves: Vec<_> = children
                .iter()
                .map(|&child| build(forest, child, level + 1, options))
                .collect();
            Tree::new(label).with_leaves(leaves)
        }

        self.roots()
            .iter()
            .map(|&root| build(self, root, 1, options))
            .collect()
    }
}
