//! Ingestion types.

use serde::Serialize;
use uuid::Uuid;

use crate::dedup::MatchStrength;
use crate::invoice::InvoiceFields;

/// One uploaded file awaiting ingestion.
#[derive(Debug, Clone)]
pub struct IngestFile {
    /// Original file name.
    pub file_name: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
    /// MIME type reported by the upload.
    pub mime_type: String,
}

/// A draft invoice ready to be persisted.
#[derive(Debug, Clone)]
pub struct DraftInvoice {
    /// Target project; `None` lands the invoice in the global inbox.
    pub project_id: Option<Uuid>,
    /// The submitting user.
    pub user_id: Uuid,
    /// Normalized candidate fields.
    pub fields: InvoiceFields,
    /// Extractor confidence, if extraction supplied one.
    pub confidence: Option<f32>,
    /// Recognized-text snippet for operator review.
    pub raw_text: Option<String>,
    /// Original file name.
    pub file_name: String,
    /// MIME type reported by the upload.
    pub mime_type: String,
    /// Original file bytes, persisted for later preview and stamping.
    pub file_content: Vec<u8>,
}

/// Outcome of ingesting a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The draft was persisted.
    Accepted {
        /// Id of the created invoice.
        invoice_id: Uuid,
    },
    /// A likely duplicate already exists; the document was discarded.
    Duplicate {
        /// How confidently the existing invoice matched.
        strength: MatchStrength,
    },
    /// Extraction or persistence failed for this file only.
    Failed {
        /// The collaborator's raw message where available.
        message: String,
    },
}

/// Per-file report returned to the uploading operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestItemReport {
    /// Original file name.
    pub file_name: String,
    /// What happened to this file.
    #[serde(flatten)]
    pub outcome: IngestOutcome,
}
