//! Output formatting for CLI commands.
//!
//! Generated commands go to stdout so they can be piped into a shell or a
//! file; group headers are shell comments for the same reason.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::plan::ChangeDescriptor;
use crate::reconciler::ReconciliationReport;
use crate::terraform::ExecutionSummary;

/// Output formatter for CLI.
#[derive(Debug, Default)]
pub struct OutputFormatter;

/// Change row for table display.
#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Actions")]
    actions: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resource group")]
    resource_group: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Formats generated commands and notices, grouped by resource.
    #[must_use]
    pub fn format_report(&self, report: &ReconciliationReport) -> String {
        if report.is_empty() {
            return format!("{}\n", "# Nothing to import or remove.".green());
        }

        let mut output = String::new();
        for group in report.groups() {
            let _ = writeln!(output, "\n{}", format!("# {}", group.name).bold().cyan());
            for record in &group.commands {
                let _ = writeln!(output, "{}", record.command);
            }
            for notice in &group.notices {
                let _ = writeln!(output, "{}", format!("# {notice}").yellow());
            }
        }

        output
    }

    /// Formats parsed change descriptors as a table.
    #[must_use]
    pub fn format_changes(&self, descriptors: &[ChangeDescriptor]) -> String {
        if descriptors.is_empty() {
            return format!("{} No resource changes in plan.\n", "✓".green());
        }

        let rows: Vec<ChangeRow> = descriptors
            .iter()
            .map(|d| ChangeRow {
                actions: Self::color_actions(d),
                name: d.name.clone(),
                resource_group: d.resource_group.clone(),
                resource_type: d.resource_type.clone(),
                address: d.address.clone(),
            })
            .collect();

        let creates = descriptors.iter().filter(|d| d.is_create()).count();
        let deletes = descriptors.iter().filter(|d| d.is_delete()).count();

        let mut output = Table::new(rows).to_string();
        let _ = write!(
            output,
            "\n\n{} changes: {} to create, {} to delete\n",
            descriptors.len(),
            creates.to_string().green(),
            deletes.to_string().red()
        );
        output
    }

    /// Formats the outcome of running the commands.
    #[must_use]
    pub fn format_execution(&self, summary: &ExecutionSummary) -> String {
        let mut output = String::new();
        let line = summary.to_string();

        if summary.failed.is_empty() {
            let _ = writeln!(output, "{} {line}", "✓".green());
        } else {
            let _ = writeln!(output, "{} {line}", "✗".red());
            for command in &summary.failed {
                let _ = writeln!(output, "   - {command}");
            }
        }

        output
    }

    /// Actions of a change, colored by effect.
    fn color_actions(descriptor: &ChangeDescriptor) -> String {
        let label = descriptor.actions_label();
        match (descriptor.is_create(), descriptor.is_delete()) {
            (true, true) => label.yellow().to_string(),
            (true, false) => label.green().to_string(),
            (false, true) => label.red().to_string(),
            (false, false) => label,
        }
    }
}
