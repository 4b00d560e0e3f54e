//! Multi-file invoice ingestion.
//!
//! Uploaded documents are processed strictly one at a time: extract,
//! normalize, duplicate-check, persist as a draft. Each file's outcome
//! is tracked independently so one failed extraction neither blocks nor
//! rolls back the rest of the batch.

pub mod error;
pub mod service;
pub mod types;

pub use error::IngestError;
pub use service::{IngestService, InvoiceGateway};
pub use types::{DraftInvoice, IngestFile, IngestItemReport, IngestOutcome};
