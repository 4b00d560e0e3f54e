//! Allocation reconciliation for Callsheet.
//!
//! This module implements the numeric core of the invoice workflow:
//! attaching portions of an invoice's net amount to budget lines,
//! reporting the unallocated remainder, and the vendor-history
//! suggestion policy.
//!
//! # Modules
//!
//! - `types` - Balance report and tolerance constant
//! - `error` - Allocation-specific error types
//! - `reconciler` - Balance computation and amount validation
//! - `suggest` - Vendor-history pre-selection policy

pub mod error;
pub mod reconciler;
pub mod suggest;
pub mod types;

#[cfg(test)]
mod reconciler_props;

pub use error::AllocationError;
pub use reconciler::Reconciler;
pub use suggest::{Preselection, SUGGESTION_HISTORY_LIMIT, preselect};
pub use types::{BALANCE_TOLERANCE, BalanceReport};
