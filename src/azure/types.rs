//! Azure resource kinds and lookup types.

use serde::Deserialize;

/// Closed registry of Terraform types this tool can resolve.
const REGISTRY: &[(&str, ResourceKind)] = &[
    ("azurerm_virtual_machine", ResourceKind::VirtualMachine),
    ("azurerm_resource_group", ResourceKind::ResourceGroup),
    ("azurerm_service_plan", ResourceKind::AppServicePlan),
    ("azurerm_app_service_plan", ResourceKind::AppServicePlan),
    ("azurerm_managed_disk", ResourceKind::ManagedDisk),
    (
        "azurerm_virtual_machine_extension",
        ResourceKind::VirtualMachineExtension,
    ),
];

/// Kind of Azure resource a Terraform type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `Microsoft.Compute/virtualMachines`.
    VirtualMachine,
    /// `Microsoft.Resources/resourceGroups`.
    ResourceGroup,
    /// `Microsoft.Web/serverfarms`.
    AppServicePlan,
    /// `Microsoft.Compute/disks`.
    ManagedDisk,
    /// `Microsoft.Compute/virtualMachines/extensions`, derived from the plan.
    VirtualMachineExtension,
}

/// A single ARM `GET` to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Path below the ARM endpoint, starting with `/subscriptions/`.
    pub path: String,
    /// `api-version` query parameter.
    pub api_version: &'static str,
}

/// Outcome of resolving a change descriptor to an Azure resource ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The resource exists with this ID.
    Found(String),
    /// The resource does not exist or its name is not known yet.
    NotFound,
    /// No resolver is registered for the resource type.
    Unsupported,
}

/// The part of an ARM resource body this tool reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ArmResource {
    /// Fully qualified resource ID.
    pub id: String,
    /// Resource name.
    #[serde(default)]
    pub name: Option<String>,
}

impl ResourceKind {
    /// Looks up the kind for a Terraform resource type. Matching is exact.
    #[must_use]
    pub fn from_terraform_type(resource_type: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(ty, _)| *ty == resource_type)
            .map(|(_, kind)| *kind)
    }

    /// Terraform types with a registered resolver.
    #[must_use]
    pub fn supported_types() -> Vec<&'static str> {
        REGISTRY.iter().map(|(ty, _)| *ty).collect()
    }

    /// Returns true if lookups of this kind are scoped to a resource group.
    #[must_use]
    pub const fn needs_resource_group(self) -> bool {
        matches!(
            self,
            Self::VirtualMachine | Self::AppServicePlan | Self::ManagedDisk
        )
    }

    /// Builds the ARM request for a resource of this kind.
    ///
    /// Returns `None` for kinds resolved from plan data alone.
    #[must_use]
    pub fn lookup_request(
        self,
        subscription: &str,
        resource_group: &str,
        name: &str,
    ) -> Option<LookupRequest> {
        let scoped = |provider: &str| {
            format!(
                "/subscriptions/{subscription}/resourceGroups/{resource_group}/providers/{provider}/{name}"
            )
        };

        let request = match self {
            Self::VirtualMachine => LookupRequest {
                path: scoped("Microsoft.Compute/virtualMachines"),
                api_version: "2023-03-01",
            },
            Self::ResourceGroup => LookupRequest {
                path: format!("/subscriptions/{subscription}/resourcegroups/{name}"),
                api_version: "2021-04-01",
            },
            Self::AppServicePlan => LookupRequest {
                path: scoped("Microsoft.Web/serverfarms"),
                api_version: "2022-03-01",
            },
            Self::ManagedDisk => LookupRequest {
                path: scoped("Microsoft.Compute/disks"),
                api_version: "2023-01-02",
            },
            Self::VirtualMachineExtension => return None,
        };

        Some(request)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::VirtualMachine => "virtual machine",
            Self::ResourceGroup => "resource group",
            Self::AppServicePlan => "app service plan",
            Self::ManagedDisk => "managed disk",
            Self::VirtualMachineExtension => "virtual machine extension",
        };
        write!(f, "{s}")
    }
}
