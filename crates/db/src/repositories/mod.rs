//! Repository abstractions for data access.

pub mod allocation;
pub mod budget;
pub mod invoice;
pub mod project;

#[cfg(test)]
mod allocation_integration_tests;
#[cfg(test)]
mod budget_integration_tests;
#[cfg(test)]
mod invoice_integration_tests;

pub use allocation::{AllocationRepository, AllocationWithLine, VendorSuggestions};
pub use budget::{BudgetLineWithUsage, BudgetRepository};
pub use invoice::{InvoiceRepository, InvoiceSummary};
pub use project::{ProjectError, ProjectRepository};
