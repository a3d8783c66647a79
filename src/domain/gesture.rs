//! Translation of drop gestures into tree mutations.

use tracing::{debug, instrument};

use crate::domain::arena::{Forest, NodeId};
use crate::domain::mutation::{Outcome, Rejection};

/// Default horizontal displacement, in pixels, that turns a drop into "nest".
pub const DEFAULT_NEST_THRESHOLD: f64 = 50.0;

/// A finished drag: which word was dragged, where it was dropped, and how
/// the pointer moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropEvent {
    pub dragged: NodeId,
    /// Word the pointer was released over, None when dropped outside any word
    pub target: Option<NodeId>,
    /// Pointer x minus the left edge of the target's bounding box
    pub displacement_x: f64,
    /// Vertical pointer movement since the drag started (negative is up)
    pub delta_y: f64,
}

/// What a drop means for the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropIntent {
    /// Make the dragged word the last child of the target
    Nest,
    /// Reorder the dragged word next to the target
    Reorder,
    /// Dropped outside any word: move to the first level
    Promote,
    /// Dropped onto itself
    Ignore,
}

/// Classifies drop events and dispatches exactly one mutation per drop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureInterpreter {
    nest_threshold: f64,
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(DEFAULT_NEST_THRESHOLD)
    }
}

impl GestureInterpreter {
    pub fn new(nest_threshold: f64) -> Self {
        Self { nest_threshold }
    }

    pub fn classify(&self, event: &DropEvent) -> DropIntent {
        match event.target {
            None => DropIntent::Promote,
            Some(target) if target == event.dragged => DropIntent::Ignore,
            Some(_) if event.displacement_x >= self.nest_threshold => DropIntent::Nest,
            Some(_) => DropIntent::Reorder,
        }
    }

    /// Apply the mutation a drop stands for.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn apply(&self, forest: &mut Forest, event: &DropEvent) -> Outcome {
        let intent = self.classify(event);
        debug!(?intent, "drop");
        match (intent, event.target) {
            (DropIntent::Nest, Some(target)) => forest.move_node(event.dragged, Some(target)),
            (DropIntent::Reorder, Some(target)) => forest
                .reparent_by_switch(event.delta_y, event.dragged, target)
                .discard(),
            (DropIntent::Ignore, _) => Outcome::Rejected(Rejection::SelfTarget),
            _ => forest.move_node(event.dragged, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WordItem;
    use rstest::rstest;

    fn item(name: &str, items: Vec<WordItem>) -> WordItem {
        WordItem {
            id: None,
            name: name.to_string(),
            items,
        }
    }

    fn names(items: &[WordItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[rstest]
    #[case(50.0, DropIntent::Nest)]
    #[case(120.0, DropIntent::Nest)]
    #[case(49.9, DropIntent::Reorder)]
    #[case(-10.0, DropIntent::Reorder)]
    fn given_displacement_when_classifying_then_threshold_decides(
        #[case] displacement_x: f64,
        #[case] expected: DropIntent,
    ) {
        let forest = Forest::from_items(&[item("a", vec![]), item("b", vec![])]);
        let event = DropEvent {
            dragged: forest.roots()[0],
            target: Some(forest.roots()[1]),
            displacement_x,
            delta_y: 0.0,
        };
        assert_eq!(GestureInterpreter::default().classify(&event), expected);
    }

    #[test]
    fn given_drop_outside_any_word_when_applied_then_promotes_to_root() {
        let mut forest = Forest::from_items(&[item("a", vec![item("b", vec![])])]);
        let b = forest.resolve("a/b").unwrap();
        let event = DropEvent {
            dragged: b,
            target: None,
            displacement_x: 0.0,
            delta_y: 0.0,
        };

        assert!(GestureInterpreter::default().apply(&mut forest, &event).is_applied());
        assert_eq!(names(&forest.snapshot()), vec!["a", "b"]);
    }

    #[test]
    fn given_wide_drop_when_applied_then_nests_inside_target() {
        let mut forest = Forest::from_items(&[item("a", vec![]), item("b", vec![])]);
        let a = forest.resolve("a").unwrap();
        let b = forest.resolve("b").unwrap();
        let event = DropEvent {
            dragged: b,
            target: Some(a),
            displacement_x: 30.0,
            delta_y: -20.0,
        };

        let outcome = GestureInterpreter::new(20.0).apply(&mut forest, &event);

        assert!(outcome.is_applied());
        assert_eq!(forest.find_parent(b), Some(a));
    }

    #[test]
    fn given_narrow_upward_drop_when_applied_then_reorders_siblings() {
        let mut forest = Forest::from_items(&[item("a", vec![]), item("b", vec![]), item("c", vec![])]);
        let a = forest.resolve("a").unwrap();
        let c = forest.resolve("c").unwrap();
        let event = DropEvent {
            dragged: c,
            target: Some(a),
            displacement_x: 4.0,
            delta_y: -40.0,
        };

        assert!(GestureInterpreter::default().apply(&mut forest, &event).is_applied());
        assert_eq!(names(&forest.snapshot()), vec!["c", "a", "b"]);
    }

    #[test]
    fn given_drop_onto_itself_when_applied_then_nothing_changes() {
        let mut forest = Forest::from_items(&[item("a", vec![]), item("b", vec![])]);
        let a = forest.resolve("a").unwrap();
        let before = forest.snapshot();
        let event = DropEvent {
            dragged: a,
            target: Some(a),
            displacement_x: 0.0,
            delta_y: 10.0,
        };

        assert_eq!(
            GestureInterpreter::default().apply(&mut forest, &event),
            Outcome::Rejected(Rejection::SelfTarget)
        );
        assert_eq!(forest.snapshot(), before);
    }
}
