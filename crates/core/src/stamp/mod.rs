//! External PDF stamping collaborator.
//!
//! Finalized invoices get a footer stamped onto the original document:
//! project, internal invoice number, and a compact per-line allocation
//! breakdown. Footer composition is owned here; the byte-level PDF
//! mutation is delegated to the collaborator.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// One allocation line in the stamped footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationBreakdownLine {
    /// Budget account number the amount was charged to.
    pub account_number: String,
    /// Budget account description.
    pub account_description: String,
    /// Allocated amount.
    pub amount: Decimal,
}

/// Composes the footer text appended to a finalized invoice document.
#[must_use]
pub fn compose_footer(
    project_name: &str,
    internal_id: i32,
    currency: &str,
    lines: &[AllocationBreakdownLine],
) -> String {
    let mut footer = format!("{project_name} | Invoice #{internal_id}");
    if lines.is_empty() {
        return footer;
    }

    footer.push('\n');
    let breakdown: Vec<String> = lines
        .iter()
        .map(|line| {
            format!(
                "{} {}: {} {currency}",
                line.account_number, line.account_description, line.amount
            )
        })
        .collect();
    footer.push_str(&breakdown.join("; "));
    footer
}

/// Errors from the stamping collaborator.
#[derive(Debug, Error)]
pub enum StampError {
    /// The collaborator answered with an error; its raw message is kept.
    #[error("Stamping service error: {0}")]
    Service(String),

    /// The source bytes were not a stampable document.
    #[error("Document cannot be stamped: {0}")]
    InvalidDocument(String),
}

impl StampError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Service(_) => 502,
            Self::InvalidDocument(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Service(_) => "STAMPING_FAILED",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
        }
    }
}

/// Appends an annotation footer to a PDF document.
#[async_trait]
pub trait DocumentStamper: Send + Sync {
    /// Stamps the footer onto the document, returning the modified bytes.
    ///
    /// # Errors
    ///
    /// Returns `StampError` when the collaborator fails or the source
    /// bytes are not a stampable document.
    async fn stamp(&self, document: &[u8], footer: &str) -> Result<Vec<u8>, StampError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_footer_names_project_and_internal_id() {
        let footer = compose_footer("Sunset Over Prague", 42, "CZK", &[]);
        assert_eq!(footer, "Sunset Over Prague | Invoice #42");
    }

    #[test]
    fn test_footer_breaks_down_allocations_per_line() {
        let lines = vec![
            AllocationBreakdownLine {
                account_number: "1101".to_string(),
                account_description: "Director fee".to_string(),
                amount: dec!(5000),
            },
            AllocationBreakdownLine {
                account_number: "2201".to_string(),
                account_description: "Camera rental".to_string(),
                amount: dec!(1200.50),
            },
        ];

        let footer = compose_footer("Sunset Over Prague", 42, "CZK", &lines);
        assert!(footer.starts_with("Sunset Over Prague | Invoice #42\n"));
        assert!(footer.contains("1101 Director fee: 5000 CZK"));
        assert!(footer.contains("2201 Camera rental: 1200.50 CZK"));
    }
}
