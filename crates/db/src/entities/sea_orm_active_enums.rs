//! Database enum mappings.
//!
//! The core crate owns the domain enums; these are their Postgres
//! representations, converted at the repository boundary.

use callsheet_core::invoice::{InvoiceStatus as CoreInvoiceStatus, ProjectRole as CoreProjectRole};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice lifecycle status, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Approved by a line producer, awaiting review.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Final-approved, immutable.
    #[sea_orm(string_value = "final_approved")]
    FinalApproved,
    /// Rejected back to the submitter.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<CoreInvoiceStatus> for InvoiceStatus {
    fn from(status: CoreInvoiceStatus) -> Self {
        match status {
            CoreInvoiceStatus::Draft => Self::Draft,
            CoreInvoiceStatus::Approved => Self::Approved,
            CoreInvoiceStatus::FinalApproved => Self::FinalApproved,
            CoreInvoiceStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<InvoiceStatus> for CoreInvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Approved => Self::Approved,
            InvoiceStatus::FinalApproved => Self::FinalApproved,
            InvoiceStatus::Rejected => Self::Rejected,
        }
    }
}

/// Per-project team role, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "project_role")]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    /// Read-only access.
    #[sea_orm(string_value = "viewer")]
    Viewer,
    /// May upload and resubmit invoices.
    #[sea_orm(string_value = "submitter")]
    Submitter,
    /// May allocate and approve.
    #[sea_orm(string_value = "line_producer")]
    LineProducer,
    /// May review, finalize and reject.
    #[sea_orm(string_value = "producer")]
    Producer,
}

impl From<CoreProjectRole> for ProjectRole {
    fn from(role: CoreProjectRole) -> Self {
        match role {
            CoreProjectRole::Viewer => Self::Viewer,
            CoreProjectRole::Submitter => Self::Submitter,
            CoreProjectRole::LineProducer => Self::LineProducer,
            CoreProjectRole::Producer => Self::Producer,
        }
    }
}

impl From<ProjectRole> for CoreProjectRole {
    fn from(role: ProjectRole) -> Self {
        match role {
            ProjectRole::Viewer => Self::Viewer,
            ProjectRole::Submitter => Self::Submitter,
            ProjectRole::LineProducer => Self::LineProducer,
            ProjectRole::Producer => Self::Producer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_status_round_trips_through_core() {
        for status in [
            CoreInvoiceStatus::Draft,
            CoreInvoiceStatus::Approved,
            CoreInvoiceStatus::FinalApproved,
            CoreInvoiceStatus::Rejected,
        ] {
            let db: InvoiceStatus = status.into();
            assert_eq!(CoreInvoiceStatus::from(db), status);
        }
    }

    #[test]
    fn test_project_role_round_trips_through_core() {
        for role in [
            CoreProjectRole::Viewer,
            CoreProjectRole::Submitter,
            CoreProjectRole::LineProducer,
            CoreProjectRole::Producer,
        ] {
            let db: ProjectRole = role.into();
            assert_eq!(CoreProjectRole::from(db), role);
        }
    }
}
