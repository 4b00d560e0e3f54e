//! Invoice lifecycle management for Callsheet.
//!
//! This module implements the invoice lifecycle state machine,
//! actor roles with explicit capabilities, and extracted-field handling.
//!
//! # Modules
//!
//! - `types` - Invoice domain types (InvoiceStatus, InvoiceFields)
//! - `error` - Invoice-specific error types
//! - `lifecycle` - State transition logic
//! - `roles` - Project roles and actor capabilities

pub mod error;
pub mod lifecycle;
pub mod roles;
pub mod types;

#[cfg(test)]
mod lifecycle_props;

pub use error::InvoiceError;
pub use lifecycle::{InvoiceLifecycle, LifecycleAction};
pub use roles::{ActorCapabilities, ProjectRole};
pub use types::{InvoiceFields, InvoiceStatus};
