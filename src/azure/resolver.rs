//! Resolution of change descriptors to Azure resource IDs.

use tracing::debug;

use crate::error::Result;
use crate::plan::{is_concrete, ChangeDescriptor};

use super::lookup::ResourceLookup;
use super::types::{ResourceKind, Resolution};

/// Maps change descriptors to Azure resource IDs.
pub struct Resolver<'a> {
    /// ARM lookup backend.
    lookup: &'a dyn ResourceLookup,
    /// Subscription to look resources up in.
    subscription: &'a str,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for one subscription.
    #[must_use]
    pub const fn new(lookup: &'a dyn ResourceLookup, subscription: &'a str) -> Self {
        Self {
            lookup,
            subscription,
        }
    }

    /// Resolves a descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails. A missing resource is
    /// [`Resolution::NotFound`], not an error.
    pub async fn resolve(&self, descriptor: &ChangeDescriptor) -> Result<Resolution> {
        let Some(kind) = ResourceKind::from_terraform_type(&descriptor.resource_type) else {
            debug!(
                "No resolver for type {} (supported: {})",
                descriptor.resource_type,
                ResourceKind::supported_types().join(", ")
            );
            return Ok(Resolution::Unsupported);
        };

        if kind == ResourceKind::VirtualMachineExtension {
            return Ok(Self::extension_id(descriptor));
        }

        if !is_concrete(&descriptor.name)
            || (kind.needs_resource_group() && !is_concrete(&descriptor.resource_group))
        {
            debug!(
                "Skipping lookup of {}: name '{}' or resource group '{}' is not known",
                descriptor.address, descriptor.name, descriptor.resource_group
            );
            return Ok(Resolution::NotFound);
        }

        let Some(request) =
            kind.lookup_request(self.subscription, &descriptor.resource_group, &descriptor.name)
        else {
            return Ok(Resolution::NotFound);
        };

        debug!("Looking up {kind} {}", descriptor.name);
        let resolution = self
            .lookup
            .resource_id(&request)
            .await?
            .map_or(Resolution::NotFound, Resolution::Found);

        Ok(resolution)
    }

    /// Extensions are addressed below their VM, whose ID the plan already holds.
    fn extension_id(descriptor: &ChangeDescriptor) -> Resolution {
        let vm_id = descriptor.after_str("virtual_machine_id");
        let name = descriptor
            .after_str("name")
            .filter(|n| !n.is_empty())
            .or_else(|| Some(descriptor.name.as_str()).filter(|n| is_concrete(n)));

        match (vm_id, name) {
            (Some(vm_id), Some(name)) if !vm_id.is_empty() => {
                Resolution::Found(format!("{vm_id}/extensions/{name}"))
            }
            _ => Resolution::NotFound,
        }
    }
}
