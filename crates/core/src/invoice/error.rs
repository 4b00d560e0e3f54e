//! Invoice error types for lifecycle management.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::invoice::types::InvoiceStatus;

/// Errors that can occur during invoice lifecycle operations.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: InvoiceStatus,
        /// The attempted target status.
        to: InvoiceStatus,
    },

    /// Allocations do not balance against the invoice net amount.
    #[error("Invoice is out of balance by {unallocated}; allocations must match the net amount within {tolerance}")]
    Unbalanced {
        /// The exact unallocated remainder (signed).
        unallocated: Decimal,
        /// The tolerance the remainder must fall within.
        tolerance: Decimal,
    },

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Attempted to modify a final-approved invoice.
    #[error("Invoice is final-approved and locked against changes")]
    InvoiceLocked,

    /// Attempted to attach an invoice that already belongs to a project.
    ///
    /// Internal numbers are assigned once; re-attaching would renumber
    /// the invoice and corrupt the original project's sequence.
    #[error("Invoice is already attached to a project")]
    AlreadyAttached,

    /// Invoice not found.
    #[error("Invoice {0} not found")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl InvoiceError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::RejectionReasonRequired
            | Self::InvoiceLocked => 400,
            Self::AlreadyAttached => 409,
            Self::Unbalanced { .. } => 422,
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Unbalanced { .. } => "OUT_OF_BALANCE",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::InvoiceLocked => "INVOICE_LOCKED",
            Self::AlreadyAttached => "ALREADY_ATTACHED",
            Self::NotFound(_) => "INVOICE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_transition_error() {
        let err = InvoiceError::InvalidTransition {
            from: InvoiceStatus::Draft,
            to: InvoiceStatus::FinalApproved,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("draft"));
        assert!(err.to_string().contains("final_approved"));
    }

    #[test]
    fn test_unbalanced_error_names_shortfall() {
        let err = InvoiceError::Unbalanced {
            unallocated: dec!(200),
            tolerance: dec!(1),
        };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "OUT_OF_BALANCE");
        assert!(err.to_string().contains("200"));
    }

    #[test]
    fn test_locked_error() {
        let err = InvoiceError::InvoiceLocked;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVOICE_LOCKED");
    }

    #[test]
    fn test_already_attached_error() {
        let err = InvoiceError::AlreadyAttached;
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "ALREADY_ATTACHED");
    }

    #[test]
    fn test_not_found_error() {
        let err = InvoiceError::NotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "INVOICE_NOT_FOUND");
    }
}
