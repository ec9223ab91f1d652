//! CLI module for tfimport.
//!
//! This module provides the command-line interface and output formatting.

mod commands;
mod output;

pub use commands::{Cli, Commands, ImportArgs};
pub use output::OutputFormatter;
