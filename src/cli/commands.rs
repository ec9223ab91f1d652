//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ActionMode, DeleteMode};

/// tfimport - import existing Azure resources into Terraform state.
#[derive(Parser, Debug)]
#[command(name = "tfimport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "TFIMPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print import and state removal commands for a plan.
    Import(ImportArgs),

    /// List the resource changes of a plan.
    List {
        /// Plan exported with `terraform show -json`.
        #[arg(short, long)]
        plan: PathBuf,

        /// Only show resources whose type contains this substring.
        #[arg(short = 't', long = "type")]
        resource_type: Option<String>,
    },
}

/// Arguments of the `import` command.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Plan exported with `terraform show -json`.
    #[arg(short, long)]
    pub plan: PathBuf,

    /// Azure subscription ID. Falls back to `TFIMPORT_SUBSCRIPTION`,
    /// `ARM_SUBSCRIPTION_ID`, then the configuration file.
    #[arg(short, long)]
    pub subscription: Option<String>,

    /// Only handle creates whose address contains this substring.
    #[arg(short, long)]
    pub module: Option<String>,

    /// Only handle resources whose type contains this substring.
    #[arg(short = 't', long = "type")]
    pub resource_type: Option<String>,

    /// How resources planned for deletion are handled.
    #[arg(long, value_enum)]
    pub delete_mode: Option<DeleteMode>,

    /// What to emit for creates that cannot be imported.
    #[arg(long = "mode", value_enum)]
    pub action_mode: Option<ActionMode>,

    /// Run every generated command after printing it.
    #[arg(long)]
    pub apply: bool,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_import_args() {
        let cli = Cli::try_parse_from([
            "tfimport",
            "import",
            "--plan",
            "plan.json",
            "--subscription",
            "sub",
            "--delete-mode",
            "removeresource",
            "--mode",
            "create",
            "--apply",
        ])
        .unwrap();

        let Commands::Import(args) = cli.command else {
            panic!("expected import command");
        };
        assert_eq!(args.plan, PathBuf::from("plan.json"));
        assert_eq!(args.subscription.as_deref(), Some("sub"));
        assert_eq!(args.delete_mode, Some(DeleteMode::RemoveResource));
        assert_eq!(args.action_mode, Some(ActionMode::Create));
        assert!(args.apply);
    }

    #[test]
    fn test_modes_default_to_config() {
        let cli = Cli::try_parse_from(["tfimport", "import", "-p", "plan.json"]).unwrap();
        let Commands::Import(args) = cli.command else {
            panic!("expected import command");
        };
        assert_eq!(args.delete_mode, None);
        assert_eq!(args.action_mode, None);
        assert!(!args.apply);
    }

    #[test]
    fn test_invalid_delete_mode() {
        let result = Cli::try_parse_from([
            "tfimport",
            "import",
            "-p",
            "plan.json",
            "--delete-mode",
            "nuke",
        ]);
        assert!(result.is_err());
    }
}
