//! Configuration module for tfimport.
//!
//! This module handles all configuration-related functionality:
//! - Parsing the optional `tfimport.yaml`
//! - `.env` loading and environment overrides
//! - Validation of the merged configuration

mod spec;
mod parser;
mod validator;

pub use spec::{ActionMode, AzureConfig, DeleteMode, ToolConfig};
pub use parser::{ConfigParser, find_config_file};
pub use validator::{ConfigValidator, ValidationResult};
