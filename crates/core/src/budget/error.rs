//! Budget parsing error types.

use thiserror::Error;

/// Errors that can occur while parsing an uploaded budget definition.
#[derive(Debug, Error)]
pub enum BudgetParseError {
    /// The source could not be read as CSV at all.
    #[error("Budget source is not valid CSV: {0}")]
    Malformed(String),

    /// A required column is missing from the header row.
    #[error("Budget source is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The source declared zero usable lines.
    #[error("Budget source contains no valid lines ({rows_seen} rows examined)")]
    NoValidLines {
        /// How many data rows were examined before giving up.
        rows_seen: usize,
    },
}

impl BudgetParseError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        422
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "MALFORMED_BUDGET",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::NoValidLines { .. } => "NO_VALID_LINES",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_valid_lines_names_rows_seen() {
        let err = BudgetParseError::NoValidLines { rows_seen: 7 };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "NO_VALID_LINES");
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_missing_column_names_the_column() {
        let err = BudgetParseError::MissingColumn("account_number");
        assert!(err.to_string().contains("account_number"));
    }
}
