//! Terraform command module.
//!
//! This module builds the `state rm`, `apply -target` and `import` command
//! lines and optionally runs them.

mod command;
mod runner;

pub use command::{shell_quote, CommandKind, CommandRecord, Shell, TerraformCommands};
pub use runner::{execute_all, CommandRunner, ExecutionSummary, ProcessRunner};
