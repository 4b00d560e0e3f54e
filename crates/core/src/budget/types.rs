//! Budget domain types.

use rust_decimal::Decimal;
use serde::Serialize;

/// One budget line recovered from an uploaded budget definition.
///
/// Lines are immutable once persisted; spending against them is derived
/// from invoice allocations, never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedBudgetLine {
    /// Account number within the production chart of accounts.
    pub account_number: String,
    /// Human-readable account description.
    pub account_description: String,
    /// Category the account rolls up into.
    pub category_number: String,
    /// Human-readable category description.
    pub category_description: String,
    /// Originally allotted amount, in the owning project's currency.
    pub amount: Decimal,
}

/// Spending position of a single budget line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetLineUsage {
    /// Originally allotted amount.
    pub original_amount: Decimal,
    /// Sum of all allocations charged against this line.
    pub spent_amount: Decimal,
    /// `original_amount - spent_amount`. Negative when over-allocated;
    /// over-allocation is surfaced here, never blocked.
    pub remaining_amount: Decimal,
}

impl BudgetLineUsage {
    /// Derives the usage position from the allotted and spent totals.
    #[must_use]
    pub fn derive(original_amount: Decimal, spent_amount: Decimal) -> Self {
        Self {
            original_amount,
            spent_amount,
            remaining_amount: original_amount - spent_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_remaining_equals_original_with_zero_spent() {
        let usage = BudgetLineUsage::derive(dec!(125000.50), dec!(0));
        assert_eq!(usage.remaining_amount, dec!(125000.50));
    }

    #[test]
    fn test_over_allocation_goes_negative() {
        let usage = BudgetLineUsage::derive(dec!(1000), dec!(1200));
        assert_eq!(usage.remaining_amount, dec!(-200));
    }
}
