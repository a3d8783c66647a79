//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Clock) but are
//! themselves concrete structs, not traits.

mod workspace;

pub use workspace::{DropReport, Workspace, WorkspaceService};
