//! External document extraction collaborator.
//!
//! Extraction is consumed as an opaque function: document bytes (or
//! pre-extracted text for spreadsheet sources) in, candidate invoice
//! fields plus a confidence score out. The HTTP client lives in the API
//! crate; this module owns only the contract.

pub mod types;

pub use types::{ExtractedFields, ExtractionError, ExtractionPayload, ExtractionRequest};

use async_trait::async_trait;

/// Extracts candidate invoice fields from an uploaded document.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Runs extraction on a single document.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError` when the collaborator fails or returns
    /// an unusable response. The caller marks the single affected
    /// document failed; other documents in the batch are unaffected.
    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractedFields, ExtractionError>;
}
