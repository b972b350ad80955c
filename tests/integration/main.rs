//! Integration tests for termreel

mod helpers;

mod cli_test;
mod recording_test;
mod render_test;
