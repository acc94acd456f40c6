//! CLI module
//!
//! Command-line interface for running LMS extract-and-load processes.
//!
//! # Commands
//!
//! - `run` - Fetch and load one, several or all processes
//! - `get` - Fetch a single item by id
//! - `processes` - List process names and default targets
//! - `validate` - Load and validate settings

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
