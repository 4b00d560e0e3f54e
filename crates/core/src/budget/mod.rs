//! Budget ledger: parsing uploaded budget definitions and line usage math.
//!
//! A project's budget arrives as a CSV export from the production
//! accounting tool. Parsing is all-or-nothing at the budget level:
//! individual unusable rows are skipped, but a source that yields zero
//! usable lines rejects the whole upload.

pub mod error;
pub mod parser;
pub mod types;

pub use error::BudgetParseError;
pub use parser::BudgetParser;
pub use types::{BudgetLineUsage, ParsedBudgetLine};
