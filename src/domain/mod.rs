//! Domain layer: the word forest and the operations on it
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod catalog;
pub mod entities;
pub mod error;
pub mod gesture;
pub mod lookup;
pub mod mutation;
pub mod render;
pub mod store;

pub use arena::{Forest, NodeId, WordNode};
pub use catalog::{HierarchyCatalog, SaveKind};
pub use entities::*;
pub use error::DomainError;
pub use gesture::{DropEvent, DropIntent, GestureInterpreter, DEFAULT_NEST_THRESHOLD};
pub use mutation::{Outcome, Rejection};
pub use render::{RenderOptions, TreeRender};
pub use store::NodeStore;
