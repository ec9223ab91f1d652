//! Reconciler turning plan changes into Terraform commands.
//!
//! Each change descriptor is handled on its own: deletions become state
//! removals (or targeted destroys), creations of resources that already exist
//! in Azure become imports. A failure on one descriptor degrades to a notice
//! for that descriptor only.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::azure::{Resolution, Resolver, ResourceLookup};
use crate::cli::ImportArgs;
use crate::config::{ActionMode, DeleteMode, ToolConfig};
use crate::error::{ConfigError, Result};
use crate::plan::ChangeDescriptor;
use crate::terraform::{CommandRecord, TerraformCommands};

/// Settings for one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Azure subscription to look resources up in.
    pub subscription: String,
    /// Only handle creates whose address contains this substring.
    pub module_filter: Option<String>,
    /// How resources planned for deletion are handled.
    pub delete_mode: DeleteMode,
    /// What to emit for creates that cannot be imported.
    pub action_mode: ActionMode,
    /// Run the generated commands after printing them.
    pub apply: bool,
    /// Terraform binary used in generated commands.
    pub terraform_bin: String,
}

impl ReconcileSettings {
    /// Creates settings with non-destructive defaults.
    #[must_use]
    pub fn new(subscription: impl Into<String>) -> Self {
        Self {
            subscription: subscription.into(),
            module_filter: None,
            delete_mode: DeleteMode::default(),
            action_mode: ActionMode::default(),
            apply: false,
            terraform_bin: String::from("terraform"),
        }
    }

    /// Merges command-line arguments over the loaded configuration.
    ///
    /// `config` already carries the environment overrides, so a subscription
    /// resolves as flag, then `TFIMPORT_SUBSCRIPTION`, then
    /// `ARM_SUBSCRIPTION_ID`, then the file.
    ///
    /// # Errors
    ///
    /// Returns an error if no subscription is set anywhere.
    pub fn from_args(args: &ImportArgs, config: &ToolConfig) -> Result<Self> {
        let subscription = args
            .subscription
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| config.subscription.clone())
            .ok_or_else(|| ConfigError::missing("subscription"))?;

        Ok(Self {
            subscription,
            module_filter: args.module.clone().or_else(|| config.module.clone()),
            delete_mode: args.delete_mode.unwrap_or(config.delete_mode),
            action_mode: args.action_mode.unwrap_or(config.action_mode),
            apply: args.apply || config.apply,
            terraform_bin: config.terraform_bin.clone(),
        })
    }
}

/// Reconciler for plan changes.
pub struct Reconciler<'a> {
    /// Resolver for Azure resource IDs.
    resolver: Resolver<'a>,
    /// Run settings.
    settings: &'a ReconcileSettings,
    /// Command builder.
    commands: TerraformCommands,
}

/// Why a resource produced a notice instead of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    /// The resource does not exist in Azure.
    NotFound,
    /// No resolver exists for the resource type.
    NotImplemented,
    /// The lookup failed.
    LookupFailed(String),
}

/// A human-readable outcome for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Display name of the resource.
    pub name: String,
    /// Terraform type.
    pub resource_type: String,
    /// Terraform address.
    pub address: String,
    /// Reason.
    pub kind: NoticeKind,
}

/// Everything produced by a reconciliation run.
#[derive(Debug, Default, Clone)]
pub struct ReconciliationReport {
    /// Generated commands, in emission order.
    pub commands: Vec<CommandRecord>,
    /// Notices, in emission order.
    pub notices: Vec<Notice>,
    /// Descriptors that produced nothing.
    pub skipped: usize,
}

/// Commands and notices of one resource, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup<'r> {
    /// Display name of the resource.
    pub name: &'r str,
    /// Commands for the resource.
    pub commands: Vec<&'r CommandRecord>,
    /// Notices for the resource.
    pub notices: Vec<&'r Notice>,
}

impl<'a> Reconciler<'a> {
    /// Creates a new reconciler.
    #[must_use]
    pub fn new(lookup: &'a dyn ResourceLookup, settings: &'a ReconcileSettings) -> Self {
        Self {
            resolver: Resolver::new(lookup, &settings.subscription),
            settings,
            commands: TerraformCommands::new(settings.terraform_bin.as_str()),
        }
    }

    /// Handles every descriptor in order.
    pub async fn reconcile(&self, descriptors: &[ChangeDescriptor]) -> ReconciliationReport {
        info!("Reconciling {} resource changes", descriptors.len());

        let mut report = ReconciliationReport::default();
        for descriptor in descriptors {
            let before = report.commands.len() + report.notices.len();
            self.reconcile_one(descriptor, &mut report).await;

            if report.commands.len() + report.notices.len() == before {
                debug!("Nothing to do for {}", descriptor.address);
                report.skipped += 1;
            }
        }

        info!(
            "Generated {} commands and {} notices ({} changes skipped)",
            report.commands.len(),
            report.notices.len(),
            report.skipped
        );
        report
    }

    /// Handles one descriptor. A replace goes through both branches.
    async fn reconcile_one(&self, descriptor: &ChangeDescriptor, report: &mut ReconciliationReport) {
        if descriptor.is_delete() {
            report.commands.push(self.delete_command(descriptor));
        }

        if descriptor.is_create() {
            if let Some(filter) = &self.settings.module_filter
                && !descriptor.address.contains(filter.as_str())
            {
                debug!("{} does not match module filter '{filter}'", descriptor.address);
                return;
            }

            self.handle_create(descriptor, report).await;
        }
    }

    /// Builds the removal command for the configured delete mode.
    fn delete_command(&self, descriptor: &ChangeDescriptor) -> CommandRecord {
        match self.settings.delete_mode {
            DeleteMode::RemoveFromState => self
                .commands
                .state_rm(&descriptor.name, &descriptor.address),
            DeleteMode::RemoveResource => self
                .commands
                .apply_target(&descriptor.name, &descriptor.address),
        }
    }

    /// Imports the resource if it exists, otherwise falls back.
    async fn handle_create(&self, descriptor: &ChangeDescriptor, report: &mut ReconciliationReport) {
        let kind = match self.resolver.resolve(descriptor).await {
            Ok(Resolution::Found(id)) => {
                report
                    .commands
                    .push(self.commands.import(&descriptor.name, &descriptor.address, &id));
                return;
            }
            Ok(Resolution::NotFound) => NoticeKind::NotFound,
            Ok(Resolution::Unsupported) => NoticeKind::NotImplemented,
            Err(e) => {
                warn!("Lookup of {} failed: {e}", descriptor.address);
                NoticeKind::LookupFailed(e.to_string())
            }
        };

        match self.settings.action_mode {
            ActionMode::Create => report
                .commands
                .push(self.commands.apply_target(&descriptor.name, &descriptor.address)),
            ActionMode::Import => report.notices.push(Notice {
                name: descriptor.name.clone(),
                resource_type: descriptor.resource_type.clone(),
                address: descriptor.address.clone(),
                kind,
            }),
        }
    }
}

impl ReconciliationReport {
    /// Returns true if nothing was generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.notices.is_empty()
    }

    /// Groups output by resource name, in ascending name order.
    ///
    /// Commands are sorted by command text, descending, before grouping, so a
    /// `state rm` precedes an `import` of the same resource. Notices follow the
    /// commands of their group.
    #[must_use]
    pub fn groups(&self) -> Vec<CommandGroup<'_>> {
        let mut sorted: Vec<&CommandRecord> = self.commands.iter().collect();
        sorted.sort_by(|a, b| b.command.cmp(&a.command));

        let mut groups: BTreeMap<&str, CommandGroup<'_>> = BTreeMap::new();
        for record in sorted {
            groups
                .entry(record.name.as_str())
                .or_insert_with(|| CommandGroup::new(&record.name))
                .commands
                .push(record);
        }
        for notice in &self.notices {
            groups
                .entry(notice.name.as_str())
                .or_insert_with(|| CommandGroup::new(&notice.name))
                .notices
                .push(notice);
        }

        groups.into_values().collect()
    }

    /// Commands in display order.
    #[must_use]
    pub fn ordered_commands(&self) -> Vec<&CommandRecord> {
        self.groups()
            .into_iter()
            .flat_map(|group| group.commands)
            .collect()
    }
}

impl<'r> CommandGroup<'r> {
    fn new(name: &'r str) -> Self {
        Self {
            name,
            commands: Vec::new(),
            notices: Vec::new(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Resource {} of type {}", self.name, self.resource_type)?;
        match &self.kind {
            NoticeKind::NotFound => write!(f, " not found"),
            NoticeKind::NotImplemented => write!(f, " is not implemented"),
            NoticeKind::LookupFailed(reason) => write!(f, " could not be resolved: {reason}"),
        }
    }
}
