//! Azure integration module.
//!
//! This module maps Terraform resource types to Azure resources and looks
//! their IDs up through Azure Resource Manager.

mod client;
mod lookup;
mod resolver;
mod types;

pub use client::{AzureClient, TokenSource, DEFAULT_ARM_ENDPOINT, DEFAULT_TIMEOUT_SECS};
pub use lookup::ResourceLookup;
pub use resolver::Resolver;
pub use types::{ArmResource, LookupRequest, Resolution, ResourceKind};

#[cfg(test)]
pub use lookup::MockResourceLookup;
