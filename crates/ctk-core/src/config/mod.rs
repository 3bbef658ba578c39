//! Configuration plumbing shared by the toolkit crates.
//!
//! The concrete configuration schema lives in the `cratedb-toolkit` crate;
//! this module provides file discovery, environment interpolation and
//! multi-file merging.

mod loader;
mod path;
mod vars;

pub use loader::{Mergeable, load_from_paths};
pub use path::{ConfigArgs, ConfigPath, is_yaml_file};
pub use vars::{InterpolationResult, interpolate};
