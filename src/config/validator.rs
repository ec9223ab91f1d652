//! Configuration validation.
//!
//! Checks the merged configuration before any plan is read or any lookup is
//! made.

use crate::error::{ConfigError, Result, TfImportError};
use tracing::debug;

use super::spec::ToolConfig;

/// Validator for tool configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any check fails.
    pub fn validate(&self, config: &ToolConfig) -> Result<ValidationResult> {
        let result = self.check(config);

        if let Some(first) = result.errors.first() {
            return Err(TfImportError::Config(ConfigError::validation(
                first.message.clone(),
                first.field.clone(),
            )));
        }

        debug!("Configuration is valid ({} warnings)", result.warnings.len());
        Ok(result)
    }

    /// Runs every check and collects the findings.
    #[must_use]
    pub fn check(&self, config: &ToolConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        if config.terraform_bin.trim().is_empty() {
            result.error("terraform_bin", "must not be empty");
        }

        let endpoint = &config.azure.endpoint;
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            result.error(
                "azure.endpoint",
                format!("'{endpoint}' is not an http(s) URL"),
            );
        } else if endpoint.starts_with("http://") {
            result
                .warnings
                .push(format!("azure.endpoint '{endpoint}' is not using TLS"));
        }

        if config.azure.timeout_secs == 0 {
            result.error("azure.timeout_secs", "must be greater than zero");
        }

        if let Some(subscription) = &config.subscription {
            if subscription.trim().is_empty() {
                result.error("subscription", "must not be blank");
            } else if !looks_like_guid(subscription) {
                result.warnings.push(format!(
                    "subscription '{subscription}' does not look like a subscription ID"
                ));
            }
        }

        if config.module.as_deref().is_some_and(str::is_empty) {
            result
                .warnings
                .push(String::from("module filter is empty and matches everything"));
        }

        result
    }
}

impl ValidationResult {
    /// Returns true if no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: format!("{field} {}", message.into()),
        });
    }
}

/// Checks the 8-4-4-4-12 hex layout of a subscription ID.
fn looks_like_guid(value: &str) -> bool {
    let groups: Vec<&str> = value.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let result = ConfigValidator::new().validate(&ToolConfig::default()).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_binary_is_rejected() {
        let config = ToolConfig {
            terraform_bin: String::from("  "),
            ..ToolConfig::default()
        };
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("terraform_bin"));
    }

    #[test]
    fn test_bad_endpoint_and_timeout() {
        let mut config = ToolConfig::default();
        config.azure.endpoint = String::from("management.azure.com");
        config.azure.timeout_secs = 0;

        let result = ConfigValidator::new().check(&config);
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["azure.endpoint", "azure.timeout_secs"]);
    }

    #[test]
    fn test_subscription_checks() {
        let blank = ToolConfig {
            subscription: Some(String::from(" ")),
            ..ToolConfig::default()
        };
        assert!(!ConfigValidator::new().check(&blank).is_valid());

        let odd = ToolConfig {
            subscription: Some(String::from("my-sub")),
            ..ToolConfig::default()
        };
        let result = ConfigValidator::new().check(&odd);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);

        let guid = ToolConfig {
            subscription: Some(String::from("0b1f6471-1bf0-4dda-aec3-cb9272f09590")),
            ..ToolConfig::default()
        };
        assert!(ConfigValidator::new().check(&guid).warnings.is_empty());
    }
}
