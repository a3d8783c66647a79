//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent references that cannot be resolved.
///
/// Tree mutations never fail with an error; they report an
/// [`Outcome`](crate::domain::Outcome) instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node reference is ambiguous: {reference} matches {matches} nodes")]
    AmbiguousNode { reference: String, matches: usize },

    #[error("hierarchy not found: {0}")]
    HierarchyNotFound(String),

    #[error("hierarchy id is ambiguous: {reference} matches {matches} hierarchies")]
    AmbiguousHierarchy { reference: String, matches: usize },
}
