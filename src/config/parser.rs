//! Configuration parser for loading the optional `tfimport.yaml`.
//!
//! This module handles loading configuration from YAML files, `.env` files
//! and environment variables.

use crate::error::{ConfigError, Result, TfImportError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::ToolConfig;

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["tfimport.yaml", "tfimport.yml", ".tfimport.yaml"];

/// Environment variables checked for the subscription, in order.
const SUBSCRIPTION_VARS: &[&str] = &["TFIMPORT_SUBSCRIPTION", "ARM_SUBSCRIPTION_ID"];

/// Configuration parser.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for `.env` lookup.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the directory the `.env` file is loaded from.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ToolConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(TfImportError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TfImportError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string. An empty document yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ToolConfig> {
        debug!("Parsing YAML configuration");

        if content.trim().is_empty() {
            return Ok(ToolConfig::default());
        }

        serde_yaml::from_str(content).map_err(|e| {
            TfImportError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })
    }

    /// Loads the configuration file if one is given or found, falling back to
    /// defaults, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or a file
    /// cannot be parsed.
    pub fn load(&self, explicit: Option<&Path>) -> Result<ToolConfig> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir().ok().and_then(find_config_file),
        };

        let mut config = match path {
            Some(path) => self.load_file(path)?,
            None => {
                debug!("No configuration file found, using defaults");
                ToolConfig::default()
            }
        };

        Self::apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// `lookup` reads a variable; it is a parameter so overrides can be
    /// exercised without touching the process environment.
    pub fn apply_env_overrides(config: &mut ToolConfig, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(subscription) = SUBSCRIPTION_VARS
            .iter()
            .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()))
        {
            debug!("Overriding subscription from environment");
            config.subscription = Some(subscription);
        }

        if let Some(bin) = lookup("TFIMPORT_TERRAFORM_BIN") {
            debug!("Overriding terraform_bin from environment");
            config.terraform_bin = bin;
        }

        if let Some(endpoint) = lookup("TFIMPORT_ARM_ENDPOINT") {
            debug!("Overriding azure.endpoint from environment");
            config.azure.endpoint = endpoint;
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                TfImportError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Returns a static ARM token from `ARM_ACCESS_TOKEN`, if set.
    #[must_use]
    pub fn get_access_token() -> Option<String> {
        std::env::var("ARM_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Finds a configuration file in the given directory or its parents.
#[must_use]
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActionMode, DeleteMode};
    use std::collections::HashMap;

    #[test]
    fn test_parse_empty_config() {
        let config = ConfigParser::new().parse_yaml("", None).unwrap();
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
subscription: 00000000-0000-0000-0000-000000000000
delete_mode: removeresource
action_mode: create
apply: true
module: module.network
terraform_bin: tofu
azure:
  endpoint: https://management.usgovcloudapi.net
  timeout_secs: 10
";
        let config = ConfigParser::new().parse_yaml(yaml, None).unwrap();

        assert_eq!(
            config.subscription.as_deref(),
            Some("00000000-0000-0000-0000-000000000000")
        );
        assert_eq!(config.delete_mode, DeleteMode::RemoveResource);
        assert_eq!(config.action_mode, ActionMode::Create);
        assert!(config.apply);
        assert_eq!(config.module.as_deref(), Some("module.network"));
        assert_eq!(config.terraform_bin, "tofu");
        assert_eq!(config.azure.timeout_secs, 10);
    }

    #[test]
    fn test_parse_invalid_mode() {
        let err = ConfigParser::new()
            .parse_yaml("delete_mode: nuke", Some(Path::new("tfimport.yaml")))
            .unwrap_err();
        match err {
            TfImportError::Config(ConfigError::ParseError { location, .. }) => {
                assert_eq!(location.as_deref(), Some("tfimport.yaml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ARM_SUBSCRIPTION_ID", "from-arm"),
            ("TFIMPORT_TERRAFORM_BIN", "tofu"),
        ]);
        let mut config = ToolConfig {
            subscription: Some(String::from("from-file")),
            ..ToolConfig::default()
        };

        ConfigParser::apply_env_overrides(&mut config, |k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.subscription.as_deref(), Some("from-arm"));
        assert_eq!(config.terraform_bin, "tofu");
        assert_eq!(config.azure.endpoint, "https://management.azure.com");
    }

    #[test]
    fn test_tfimport_subscription_wins_over_arm() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TFIMPORT_SUBSCRIPTION", "mine"),
            ("ARM_SUBSCRIPTION_ID", "theirs"),
        ]);
        let mut config = ToolConfig::default();

        ConfigParser::apply_env_overrides(&mut config, |k| env.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.subscription.as_deref(), Some("mine"));
    }

    #[test]
    fn test_find_config_file_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("envs").join("prod");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("tfimport.yaml"), "apply: false\n").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join("tfimport.yaml"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigParser::new()
            .load(Some(dir.path().join("nope.yaml").as_path()))
            .unwrap_err();
        assert!(matches!(err, TfImportError::Config(ConfigError::FileNotFound { .. })));
    }
}
