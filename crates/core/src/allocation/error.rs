//! Allocation error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during allocation operations.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Allocation amount must be strictly positive.
    #[error("Allocation amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The rejected amount.
        amount: Decimal,
    },

    /// Attempted to change allocations on a final-approved invoice.
    #[error("Invoice is final-approved and locked against allocation changes")]
    InvoiceLocked,

    /// Allocation not found.
    #[error("Allocation {0} not found")]
    NotFound(Uuid),

    /// Referenced budget line not found.
    #[error("Budget line {0} not found")]
    BudgetLineNotFound(Uuid),

    /// Referenced invoice not found.
    #[error("Invoice {0} not found")]
    InvoiceNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AllocationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount { .. } | Self::InvoiceLocked => 400,
            Self::NotFound(_) | Self::BudgetLineNotFound(_) | Self::InvoiceNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::InvoiceLocked => "INVOICE_LOCKED",
            Self::NotFound(_) => "ALLOCATION_NOT_FOUND",
            Self::BudgetLineNotFound(_) => "BUDGET_LINE_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_non_positive_amount_error() {
        let err = AllocationError::NonPositiveAmount { amount: dec!(-5) };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "NON_POSITIVE_AMOUNT");
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_locked_error() {
        let err = AllocationError::InvoiceLocked;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVOICE_LOCKED");
    }

    #[test]
    fn test_not_found_errors() {
        assert_eq!(AllocationError::NotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(
            AllocationError::BudgetLineNotFound(Uuid::nil()).status_code(),
            404
        );
    }
}
