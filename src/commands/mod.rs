//! Subcommand handlers for the termreel binary.

pub mod completions;
pub mod config;
pub mod run;
