//! Extraction request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::invoice::InvoiceFields;

/// What the extractor is given to work with.
#[derive(Debug, Clone)]
pub enum ExtractionPayload {
    /// Raw document bytes (PDFs, images).
    Document {
        /// The document content.
        content: Vec<u8>,
        /// MIME type of the content.
        mime_type: String,
    },
    /// Pre-extracted plain text (spreadsheet sources are flattened
    /// client-side before upload).
    Text(String),
}

/// A single extraction request.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Original file name, passed through for the extractor's context.
    pub file_name: String,
    /// The document payload.
    pub payload: ExtractionPayload,
}

/// Candidate fields returned by the extraction collaborator.
///
/// A field the extractor could not find arrives as null, never omitted,
/// so every field deserializes as `Option`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Vendor business registration identifier, as printed.
    pub ico: Option<String>,
    /// Vendor company name.
    pub company_name: Option<String>,
    /// Vendor bank account number.
    pub bank_account: Option<String>,
    /// Vendor IBAN.
    pub iban: Option<String>,
    /// Payment-matching variable symbol, as printed.
    pub variable_symbol: Option<String>,
    /// Free-text description of the invoiced work.
    pub description: Option<String>,
    /// Gross amount including VAT.
    pub amount_with_vat: Option<Decimal>,
    /// Net amount excluding VAT.
    pub amount_without_vat: Option<Decimal>,
    /// ISO currency code.
    pub currency: Option<String>,
    /// Extractor's confidence in the field set, in `[0, 1]`.
    pub confidence: Option<f32>,
    /// Snippet of the recognized text, kept for operator review.
    pub raw_text: Option<String>,
}

impl ExtractedFields {
    /// Converts the candidate fields into the editable invoice field
    /// set, normalizing identifiers on the way.
    #[must_use]
    pub fn into_invoice_fields(self) -> InvoiceFields {
        InvoiceFields {
            ico: self.ico,
            company_name: self.company_name,
            bank_account: self.bank_account,
            iban: self.iban,
            variable_symbol: self.variable_symbol,
            description: self.description,
            amount_with_vat: self.amount_with_vat,
            amount_without_vat: self.amount_without_vat,
            currency: self.currency,
        }
        .normalized()
    }
}

/// Errors from the extraction collaborator.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The collaborator answered with an error; its raw message is kept.
    #[error("Extraction service error: {0}")]
    Service(String),

    /// The collaborator answered, but the response was not usable.
    #[error("Extraction response could not be parsed: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_null_fields_deserialize_as_none() {
        let json = r#"{
            "ico": "123 45 678",
            "company_name": "Kamera Servis s.r.o.",
            "bank_account": null,
            "iban": null,
            "variable_symbol": "2024001",
            "description": null,
            "amount_with_vat": "12100.00",
            "amount_without_vat": "10000.00",
            "currency": "CZK",
            "confidence": 0.92,
            "raw_text": null
        }"#;

        let fields: ExtractedFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.bank_account, None);
        assert_eq!(fields.amount_without_vat, Some(dec!(10000.00)));
        assert_eq!(fields.confidence, Some(0.92));
    }

    #[test]
    fn test_into_invoice_fields_normalizes_identifiers() {
        let extracted = ExtractedFields {
            ico: Some("CZ 123 45 678".to_string()),
            variable_symbol: Some(" 2024 001".to_string()),
            amount_with_vat: Some(dec!(12100)),
            ..Default::default()
        };

        let fields = extracted.into_invoice_fields();
        assert_eq!(fields.ico.as_deref(), Some("12345678"));
        assert_eq!(fields.variable_symbol.as_deref(), Some("2024001"));
        assert_eq!(fields.amount_with_vat, Some(dec!(12100)));
    }
}
