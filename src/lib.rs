//! wordtree: editor for nested word hierarchies
//!
//! Layers:
//! - `domain`: forest arena, lookups, mutations, drop gestures, saved hierarchies
//! - `application`: workspace service around the session file
//! - `infrastructure`: file system and clock boundaries, service wiring
//! - `cli`: command line surface

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
