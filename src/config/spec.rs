//! Configuration types.
//!
//! This module defines the structs that map to `tfimport.yaml`. Every key is
//! optional; command-line flags take precedence over the file.

use serde::{Deserialize, Serialize};

use crate::azure::{DEFAULT_ARM_ENDPOINT, DEFAULT_TIMEOUT_SECS};

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    /// Azure subscription ID.
    #[serde(default)]
    pub subscription: Option<String>,
    /// How resources planned for deletion are handled.
    #[serde(default)]
    pub delete_mode: DeleteMode,
    /// What to emit for planned creates that cannot be imported.
    #[serde(default)]
    pub action_mode: ActionMode,
    /// Run the generated commands after printing them.
    #[serde(default)]
    pub apply: bool,
    /// Only handle creates whose address contains this substring.
    #[serde(default)]
    pub module: Option<String>,
    /// Terraform binary used in generated commands.
    #[serde(default = "default_terraform_bin")]
    pub terraform_bin: String,
    /// Azure Resource Manager settings.
    #[serde(default)]
    pub azure: AzureConfig,
}

/// Azure Resource Manager settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AzureConfig {
    /// ARM endpoint, change for sovereign clouds.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Handling of resources planned for deletion.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
pub enum DeleteMode {
    /// Untrack the resource with `terraform state rm`; Azure is left alone.
    #[default]
    #[serde(rename = "removefromstate")]
    #[value(name = "removefromstate")]
    RemoveFromState,
    /// Destroy the resource with a targeted `terraform apply`.
    #[serde(rename = "removeresource")]
    #[value(name = "removeresource")]
    RemoveResource,
}

/// Output for planned creates that cannot be imported.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ActionMode {
    /// Print a notice.
    #[default]
    Import,
    /// Emit a targeted `terraform apply` that creates the resource.
    Create,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            subscription: None,
            delete_mode: DeleteMode::default(),
            action_mode: ActionMode::default(),
            apply: false,
            module: None,
            terraform_bin: default_terraform_bin(),
            azure: AzureConfig::default(),
        }
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_terraform_bin() -> String {
    String::from("terraform")
}

fn default_endpoint() -> String {
    String::from(DEFAULT_ARM_ENDPOINT)
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl std::fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoveFromState => write!(f, "removefromstate"),
            Self::RemoveResource => write!(f, "removeresource"),
        }
    }
}

impl std::fmt::Display for ActionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Create => write!(f, "create"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_non_destructive() {
        let config = ToolConfig::default();
        assert_eq!(config.delete_mode, DeleteMode::RemoveFromState);
        assert_eq!(config.action_mode, ActionMode::Import);
        assert!(!config.apply);
        assert_eq!(config.terraform_bin, "terraform");
        assert_eq!(config.azure.endpoint, "https://management.azure.com");
    }

    #[test]
    fn test_mode_names() {
        let mode: DeleteMode = serde_yaml::from_str("removeresource").unwrap();
        assert_eq!(mode, DeleteMode::RemoveResource);
        assert_eq!(DeleteMode::RemoveFromState.to_string(), "removefromstate");

        let mode: ActionMode = serde_yaml::from_str("create").unwrap();
        assert_eq!(mode, ActionMode::Create);
    }
}
