// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tfimport
//!
//! Turns a Terraform JSON plan into the commands that reconcile it with the
//! Azure resources that already exist.
//!
//! ## Overview
//!
//! When a Terraform configuration is written for infrastructure that was
//! created by hand, `terraform plan` wants to create everything again. This
//! crate reads the plan and prints, per resource:
//!
//! - `terraform import <address> <id>` for planned creates that already exist
//! - `terraform state rm <address>` (or a targeted destroy) for planned deletes
//! - a notice for resources it cannot resolve
//!
//! ## Architecture
//!
//! 1. **Plan**: `terraform show -json` output is decoded and normalized into
//!    sorted change descriptors
//! 2. **Resolver**: each Terraform type maps to an Azure resource kind whose ID
//!    is looked up through Azure Resource Manager
//! 3. **Reconciler**: descriptors become command records, grouped by resource
//!
//! ## Modules
//!
//! - [`plan`]: Plan decoding and parsing
//! - [`azure`]: Resource kinds, ARM client and resolver
//! - [`terraform`]: Command construction and execution
//! - [`reconciler`]: Per-resource classification
//! - [`config`]: Configuration loading and validation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```sh
//! terraform plan -out main.tfplan
//! terraform show -json main.tfplan > main.json
//! tfimport import --plan main.json --subscription <subscription-id>
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod azure;
pub mod cli;
pub mod config;
pub mod error;
pub mod plan;
pub mod reconciler;
pub mod terraform;

// ============================================================================
// Re-exports
// ============================================================================

pub use azure::{AzureClient, Resolution, Resolver, ResourceKind, ResourceLookup, TokenSource};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ActionMode, ConfigParser, ConfigValidator, DeleteMode, ToolConfig};
pub use error::{Result, TfImportError};
pub use plan::{ChangeDescriptor, PlanParser};
pub use reconciler::{ReconcileSettings, Reconciler, ReconciliationReport};
pub use terraform::{CommandKind, CommandRecord, CommandRunner, ProcessRunner, TerraformCommands};
