//! Terraform plan types.
//!
//! Raw records mirror the subset of the `terraform show -json` format this
//! tool reads (see <https://developer.hashicorp.com/terraform/internals/json-format>).
//! [`ChangeDescriptor`] is the normalized view used by everything downstream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name used when neither side of a change carries a value.
pub const KNOWN_AFTER_APPLY: &str = "<known after apply>";

/// Separator between the before and after values of a renamed resource.
pub const TRANSITION_ARROW: &str = " --> ";

/// Provider name of the Azure Resource Manager provider.
pub const AZURERM_PROVIDER: &str = "registry.terraform.io/hashicorp/azurerm";

/// A Terraform plan document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanDocument {
    /// Resource changes, absent when the plan touches nothing.
    #[serde(default)]
    pub resource_changes: Option<Vec<ResourceChange>>,
}

/// One entry of `resource_changes`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceChange {
    /// Full resource address, e.g. `module.vms.azurerm_managed_disk.data`.
    #[serde(default)]
    pub address: String,
    /// Resource type, e.g. `azurerm_managed_disk`.
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Provider that owns the resource.
    #[serde(default)]
    pub provider_name: String,
    /// The planned change. Records without one are skipped.
    #[serde(default)]
    pub change: Option<Change>,
}

/// The change block of a resource change.
#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    /// Ordered actions Terraform will take.
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Attributes before the change, `null` for creates.
    #[serde(default)]
    pub before: Option<Map<String, Value>>,
    /// Attributes after the change, `null` for deletes.
    #[serde(default)]
    pub after: Option<Map<String, Value>>,
}

/// A planned action on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Nothing to do.
    NoOp,
    /// Resource will be created.
    Create,
    /// Data source will be read.
    Read,
    /// Resource will be updated in place.
    Update,
    /// Resource will be destroyed.
    Delete,
    /// Resource will be dropped from state without being destroyed.
    Forget,
    /// An action this tool does not know about.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoOp => "no-op",
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Forget => "forget",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Normalized view of a resource change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDescriptor {
    /// Planned actions, in plan order.
    pub actions: Vec<Action>,
    /// Display name, see [`super::resolve_name`].
    pub name: String,
    /// Resource address.
    pub address: String,
    /// Resource type.
    pub resource_type: String,
    /// Resource group, empty for non-azurerm resources.
    pub resource_group: String,
    /// Raw after snapshot.
    pub after: Option<Map<String, Value>>,
}

impl ChangeDescriptor {
    /// Returns true if the resource will be created.
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.actions.contains(&Action::Create)
    }

    /// Returns true if the resource will be destroyed.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.actions.contains(&Action::Delete)
    }

    /// Returns a string attribute of the after snapshot.
    #[must_use]
    pub fn after_str(&self, key: &str) -> Option<&str> {
        self.after
            .as_ref()
            .and_then(|after| after.get(key))
            .and_then(Value::as_str)
    }

    /// Comma-joined actions, e.g. `delete,create`.
    #[must_use]
    pub fn actions_label(&self) -> String {
        self.actions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Returns true if a computed name or group is a concrete value, i.e. neither
/// the unknown sentinel nor a transition.
#[must_use]
pub fn is_concrete(value: &str) -> bool {
    !value.is_empty() && value != KNOWN_AFTER_APPLY && !value.contains(TRANSITION_ARROW)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_deserialize() {
        let actions: Vec<Action> =
            serde_json::from_str(r#"["no-op", "create", "delete", "forget", "teleport"]"#)
                .unwrap();
        assert_eq!(
            actions,
            vec![
                Action::NoOp,
                Action::Create,
                Action::Delete,
                Action::Forget,
                Action::Other
            ]
        );
    }

    #[test]
    fn test_null_snapshots() {
        let change: ResourceChange = serde_json::from_str(
            r#"{"address": "a.b", "type": "a", "change": {"actions": ["create"], "before": null}}"#,
        )
        .unwrap();
        let inner = change.change.as_ref().unwrap();
        assert!(inner.before.is_none());
        assert!(inner.after.is_none());
        assert!(change.provider_name.is_empty());
    }

    #[test]
    fn test_is_concrete() {
        assert!(is_concrete("vm1"));
        assert!(!is_concrete(""));
        assert!(!is_concrete(KNOWN_AFTER_APPLY));
        assert!(!is_concrete("vm1 --> vm2"));
    }
}
