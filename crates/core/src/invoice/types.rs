//! Invoice domain types.
//!
//! This module defines the invoice status enum and the editable
//! field set that travels with every lifecycle transition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dedup::{normalize_ico, normalize_variable_symbol};

/// Invoice status in the approval lifecycle.
///
/// Invoices progress through these states from ingestion to final approval.
/// The valid transitions are:
/// - Draft → Approved (approve, balance-gated)
/// - Approved → FinalApproved (finalize, terminal)
/// - Approved → Rejected (reject, with reason)
/// - Rejected → Draft (resubmit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice is being drafted and can be modified.
    Draft,
    /// Invoice has been approved by a line producer and awaits review.
    Approved,
    /// Invoice has received final approval (immutable).
    FinalApproved,
    /// Invoice was rejected back to the submitter with a reason.
    Rejected,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::FinalApproved => "final_approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "approved" => Some(Self::Approved),
            "final_approved" => Some(Self::FinalApproved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the invoice is locked against any further change.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::FinalApproved)
    }

    /// Returns true if the invoice fields can still be edited.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !self.is_locked()
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The editable field set of an invoice.
///
/// Every lifecycle transition persists this full set together with the
/// status change, so "approve" is simultaneously "save my edits".
/// Absent values stay `None`; the extraction collaborator signals a
/// missing field as null, never by omission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceFields {
    /// Vendor business registration identifier (IČO), digits only.
    pub ico: Option<String>,
    /// Vendor company name.
    pub company_name: Option<String>,
    /// Vendor bank account number.
    pub bank_account: Option<String>,
    /// Vendor IBAN.
    pub iban: Option<String>,
    /// Payment-matching variable symbol, whitespace stripped.
    pub variable_symbol: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Gross amount including VAT.
    pub amount_with_vat: Option<Decimal>,
    /// Net amount excluding VAT (the amount allocations balance against).
    pub amount_without_vat: Option<Decimal>,
    /// ISO currency code; inherited from the project when absent.
    pub currency: Option<String>,
}

impl InvoiceFields {
    /// Returns a copy with identifier fields normalized.
    ///
    /// The IČO is reduced to its digits and the variable symbol has all
    /// whitespace stripped. Values that normalize to the empty string
    /// become `None`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut fields = self.clone();
        fields.ico = fields
            .ico
            .as_deref()
            .map(normalize_ico)
            .filter(|s| !s.is_empty());
        fields.variable_symbol = fields
            .variable_symbol
            .as_deref()
            .map(normalize_variable_symbol)
            .filter(|s| !s.is_empty());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_as_str() {
        assert_eq!(InvoiceStatus::Draft.as_str(), "draft");
        assert_eq!(InvoiceStatus::Approved.as_str(), "approved");
        assert_eq!(InvoiceStatus::FinalApproved.as_str(), "final_approved");
        assert_eq!(InvoiceStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(InvoiceStatus::parse("draft"), Some(InvoiceStatus::Draft));
        assert_eq!(
            InvoiceStatus::parse("APPROVED"),
            Some(InvoiceStatus::Approved)
        );
        assert_eq!(
            InvoiceStatus::parse("Final_Approved"),
            Some(InvoiceStatus::FinalApproved)
        );
        assert_eq!(
            InvoiceStatus::parse("rejected"),
            Some(InvoiceStatus::Rejected)
        );
        assert_eq!(InvoiceStatus::parse("invalid"), None);
    }

    #[test]
    fn test_status_lock() {
        assert!(InvoiceStatus::FinalApproved.is_locked());
        assert!(!InvoiceStatus::Draft.is_locked());
        assert!(!InvoiceStatus::Approved.is_locked());
        assert!(!InvoiceStatus::Rejected.is_locked());

        assert!(InvoiceStatus::Draft.is_editable());
        assert!(!InvoiceStatus::FinalApproved.is_editable());
    }

    #[test]
    fn test_fields_normalized() {
        let fields = InvoiceFields {
            ico: Some("CZ 123 456 78".to_string()),
            variable_symbol: Some(" 20 24 001 ".to_string()),
            amount_without_vat: Some(dec!(1000)),
            ..Default::default()
        };

        let normalized = fields.normalized();
        assert_eq!(normalized.ico.as_deref(), Some("12345678"));
        assert_eq!(normalized.variable_symbol.as_deref(), Some("2024001"));
        assert_eq!(normalized.amount_without_vat, Some(dec!(1000)));
    }

    #[test]
    fn test_fields_normalized_empty_becomes_none() {
        let fields = InvoiceFields {
            ico: Some("no digits here".to_string()),
            variable_symbol: Some("   ".to_string()),
            ..Default::default()
        };

        let normalized = fields.normalized();
        assert_eq!(normalized.ico, None);
        assert_eq!(normalized.variable_symbol, None);
    }
}
