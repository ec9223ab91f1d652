//! Execution of generated commands.
//!
//! Commands are spawned directly from their argv, one at a time, with
//! inherited stdio, so Terraform output interleaves with ours on the
//! terminal. No shell is involved, so the quoting of the printed text never
//! reaches Terraform.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{ExecError, Result};

use super::command::CommandRecord;

/// Runs generated commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `argv` (program first) and returns whether it exited successfully.
    async fn run(&self, argv: &[String]) -> Result<bool>;
}

/// Spawns the program named by `argv[0]` with the remaining arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[String]) -> Result<bool> {
        let spawn_failed = |message: String| ExecError::SpawnFailed {
            command: argv.join(" "),
            message,
        };

        let Some((program, args)) = argv.split_first() else {
            return Err(spawn_failed(String::from("empty command")).into());
        };

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_failed(e.to_string()))?;

        Ok(status.success())
    }
}

/// Summary of running a batch of commands.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Commands that exited successfully.
    pub succeeded: usize,
    /// Commands that failed or could not be started.
    pub failed: Vec<String>,
}

impl ExecutionSummary {
    /// Total number of commands run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

/// Runs every command in order. A failing command never stops the batch.
pub async fn execute_all<'a>(
    runner: &dyn CommandRunner,
    commands: impl IntoIterator<Item = &'a CommandRecord>,
) -> ExecutionSummary {
    let mut summary = ExecutionSummary::default();

    for record in commands {
        info!("Running: {}", record.command);
        match runner.run(&record.argv).await {
            Ok(true) => summary.succeeded += 1,
            Ok(false) => {
                warn!("Command exited with an error: {}", record.command);
                summary.failed.push(record.command.clone());
            }
            Err(e) => {
                warn!("{e}");
                summary.failed.push(record.command.clone());
            }
        }
    }

    summary
}

impl std::fmt::Display for ExecutionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Executed {} commands: {} succeeded, {} failed",
            self.total(),
            self.succeeded,
            self.failed.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfImportError;
    use crate::terraform::{Shell, TerraformCommands};
    use std::sync::Mutex;

    /// Records commands and fails the ones containing `fail`.
    #[derive(Default)]
    struct RecordingRunner {
        seen: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, argv: &[String]) -> Result<bool> {
            self.seen.lock().unwrap().push(argv.to_vec());
            let line = argv.join(" ");
            if line.contains("spawn") {
                return Err(TfImportError::from(ExecError::SpawnFailed {
                    command: line,
                    message: String::from("not found"),
                }));
            }
            Ok(!line.contains("fail"))
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let tf = TerraformCommands::default();
        let records = vec![
            tf.state_rm("a", "azurerm_managed_disk.fail"),
            tf.state_rm("b", "azurerm_managed_disk.spawn"),
            tf.state_rm("c", "azurerm_managed_disk.ok"),
        ];

        let runner = RecordingRunner::default();
        let summary = execute_all(&runner, &records).await;

        assert_eq!(runner.seen.lock().unwrap().len(), 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(summary.total(), 3);
    }

    #[tokio::test]
    async fn test_runner_receives_unquoted_argv() {
        let tf = TerraformCommands::default().with_shell(Shell::Cmd);
        let records = vec![tf.state_rm("vm", r#"module.vms.azurerm_virtual_machine.this["web"]"#)];

        let runner = RecordingRunner::default();
        execute_all(&runner, &records).await;

        let seen = runner.seen.lock().unwrap();
        assert_eq!(
            seen[0].last().map(String::as_str),
            Some(r#"module.vms.azurerm_virtual_machine.this["web"]"#)
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_exit_status() {
        fn argv(args: &[&str]) -> Vec<String> {
            args.iter().map(ToString::to_string).collect()
        }

        assert!(ProcessRunner.run(&argv(&["true"])).await.unwrap());
        assert!(!ProcessRunner.run(&argv(&["sh", "-c", "exit 3"])).await.unwrap());
        assert!(ProcessRunner.run(&argv(&["tfimport-no-such-binary"])).await.is_err());
        assert!(ProcessRunner.run(&[]).await.is_err());
    }
}
