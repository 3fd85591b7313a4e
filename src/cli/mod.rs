//! Command-line interface for taskexec
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch

pub mod args;
mod run;

pub use args::{Cli, Commands, ExecArgs};

pub use run::run;
