//! Terraform plan module.
//!
//! This module reads `terraform show -json` output and turns its resource
//! changes into sorted [`ChangeDescriptor`]s:
//! - Decoding plan files in any common encoding
//! - Dropping no-op changes
//! - Computing display names and resource groups

mod encoding;
mod parser;
mod types;

pub use encoding::{decode, detect, read_to_string};
pub use parser::{resolve_name, resolve_resource_group, PlanParser};
pub use types::{
    is_concrete, Action, Change, ChangeDescriptor, PlanDocument, ResourceChange,
    AZURERM_PROVIDER, KNOWN_AFTER_APPLY, TRANSITION_ARROW,
};
