//! Ingestion error types.

use thiserror::Error;

use crate::extraction::ExtractionError;

/// Errors that can occur while ingesting a document.
///
/// A detected duplicate is not an error; it is reported as an
/// [`super::IngestOutcome::Duplicate`] outcome.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The extraction collaborator failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The persistence gateway failed.
    #[error("Storage error: {0}")]
    Gateway(String),
}

impl IngestError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Extraction(_) => 502,
            Self::Gateway(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "EXTRACTION_FAILED",
            Self::Gateway(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_keeps_raw_message() {
        let err = IngestError::from(ExtractionError::Service("model overloaded".to_string()));
        assert_eq!(err.status_code(), 502);
        assert!(err.to_string().contains("model overloaded"));
    }
}
