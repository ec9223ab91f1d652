//! Resource lookup trait definition.

use async_trait::async_trait;

use crate::error::Result;

use super::types::LookupRequest;

/// Read-only access to Azure Resource Manager.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    /// Fetches a resource and returns its ID.
    ///
    /// Returns `None` if the resource does not exist.
    async fn resource_id(&self, request: &LookupRequest) -> Result<Option<String>>;
}
