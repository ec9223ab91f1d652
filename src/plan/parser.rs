//! Plan parser turning raw resource changes into change descriptors.

use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{PlanError, Result, TfImportError};

use super::encoding;
use super::types::{
    Action, ChangeDescriptor, PlanDocument, ResourceChange, AZURERM_PROVIDER, KNOWN_AFTER_APPLY,
    TRANSITION_ARROW,
};

/// Parser for Terraform JSON plans.
#[derive(Debug, Default, Clone)]
pub struct PlanParser {
    /// Keep only resources whose type contains this substring.
    type_filter: Option<String>,
}

impl PlanParser {
    /// Creates a parser without a type filter.
    #[must_use]
    pub const fn new() -> Self {
        Self { type_filter: None }
    }

    /// Keeps only resources whose type contains `filter`. Empty filters are ignored.
    #[must_use]
    pub fn with_type_filter(mut self, filter: Option<impl Into<String>>) -> Self {
        self.type_filter = filter.map(Into::into).filter(|f| !f.is_empty());
        self
    }

    /// Reads, decodes and parses a plan file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, decoded or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<ChangeDescriptor>> {
        let path = path.as_ref();
        info!("Loading plan from: {}", path.display());

        let content = encoding::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Parses a plan from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or not a JSON object.
    pub fn parse_str(&self, content: &str) -> Result<Vec<ChangeDescriptor>> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            TfImportError::Plan(PlanError::InvalidJson {
                message: e.to_string(),
            })
        })?;
        self.parse_value(value)
    }

    /// Parses an already decoded plan document.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or `resource_changes`
    /// is not an array of change records.
    pub fn parse_value(&self, value: Value) -> Result<Vec<ChangeDescriptor>> {
        if !value.is_object() {
            return Err(PlanError::malformed("top-level value is not an object").into());
        }

        let document: PlanDocument = serde_json::from_value(value)
            .map_err(|e| TfImportError::Plan(PlanError::malformed(e.to_string())))?;

        Ok(self.parse_document(document))
    }

    /// Normalizes, filters and sorts the changes of a plan document.
    #[must_use]
    pub fn parse_document(&self, document: PlanDocument) -> Vec<ChangeDescriptor> {
        let changes = document.resource_changes.unwrap_or_default();
        let total = changes.len();

        let mut descriptors: Vec<ChangeDescriptor> = changes
            .into_iter()
            .filter_map(describe)
            .filter(|d| d.actions != [Action::NoOp])
            .collect();
        debug!("{} of {total} resource changes are not no-ops", descriptors.len());

        if let Some(filter) = &self.type_filter {
            descriptors.retain(|d| d.resource_type.contains(filter.as_str()));
            debug!("{} changes match type filter '{filter}'", descriptors.len());
        }

        descriptors.sort_by(|a, b| b.name.cmp(&a.name));
        descriptors
    }
}

/// Builds the descriptor for a single resource change.
fn describe(change: ResourceChange) -> Option<ChangeDescriptor> {
    let ResourceChange {
        address,
        resource_type,
        provider_name,
        change,
    } = change;

    let Some(change) = change else {
        warn!("Skipping {address}: resource change has no change block");
        return None;
    };

    let before = change.before.as_ref();
    let after = change.after.as_ref();

    let name = resolve_name(before, after);
    let resource_group = if provider_name == AZURERM_PROVIDER {
        resolve_resource_group(before, after)
    } else {
        String::new()
    };

    Some(ChangeDescriptor {
        actions: change.actions,
        name,
        address,
        resource_type,
        resource_group,
        after: change.after,
    })
}

/// Lower-cased non-empty string attribute of a snapshot.
fn attribute(snapshot: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    snapshot
        .and_then(|s| s.get(key))
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// Computes the display name of a change from its `name` attribute.
///
/// A rename yields `"before --> after"`; a single known side yields that
/// side; no known side yields [`KNOWN_AFTER_APPLY`].
#[must_use]
pub fn resolve_name(
    before: Option<&Map<String, Value>>,
    after: Option<&Map<String, Value>>,
) -> String {
    match (attribute(before, "name"), attribute(after, "name")) {
        (Some(b), Some(a)) if b != a => format!("{b}{TRANSITION_ARROW}{a}"),
        (Some(b), _) => b,
        (None, Some(a)) => a,
        (None, None) => String::from(KNOWN_AFTER_APPLY),
    }
}

/// Computes the resource group of a change from `resource_group_name`.
///
/// Unlike [`resolve_name`], a move between groups repeats the before value on
/// both sides of the arrow (`"rg1 --> rg1"`). Output of earlier releases
/// depends on this, so it is kept.
#[must_use]
pub fn resolve_resource_group(
    before: Option<&Map<String, Value>>,
    after: Option<&Map<String, Value>>,
) -> String {
    let key = "resource_group_name";
    match (attribute(before, key), attribute(after, key)) {
        (Some(b), Some(a)) if b != a => format!("{b}{TRANSITION_ARROW}{b}"),
        (Some(b), _) => b,
        (None, Some(a)) => a,
        (None, None) => String::from(KNOWN_AFTER_APPLY),
    }
}
