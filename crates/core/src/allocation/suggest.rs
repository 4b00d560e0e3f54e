//! Vendor-history suggestion policy.
//!
//! The repository layer looks up the distinct budget lines a vendor's
//! recent invoices were allocated to; this module owns the pre-selection
//! policy applied in the allocation workflow.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// How many of the vendor's most recent invoices feed the suggestion index.
pub const SUGGESTION_HISTORY_LIMIT: u64 = 15;

/// A suggested budget line pre-selected for the allocating user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preselection {
    /// The budget line to pre-select.
    pub budget_line_id: Uuid,
    /// The pre-filled amount. Always zero: the human must explicitly
    /// confirm the amount, preventing silent misallocation.
    pub amount: Decimal,
}

/// Picks the pre-selected suggestion, if any.
///
/// The top suggestion is pre-selected only when the vendor has prior
/// history in the project and the current invoice has no allocations
/// yet. Its amount is forced to zero.
#[must_use]
pub fn preselect(
    suggested_line_ids: &[Uuid],
    existing_allocation_count: usize,
) -> Option<Preselection> {
    if existing_allocation_count > 0 {
        return None;
    }

    suggested_line_ids.first().map(|&budget_line_id| Preselection {
        budget_line_id,
        amount: Decimal::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preselects_top_suggestion_with_zero_amount() {
        let first = Uuid::new_v4();
        let lines = vec![first, Uuid::new_v4()];

        let picked = preselect(&lines, 0).unwrap();
        assert_eq!(picked.budget_line_id, first);
        assert_eq!(picked.amount, Decimal::ZERO);
    }

    #[test]
    fn test_no_preselection_without_history() {
        assert_eq!(preselect(&[], 0), None);
    }

    #[test]
    fn test_no_preselection_with_existing_allocations() {
        let lines = vec![Uuid::new_v4()];
        assert_eq!(preselect(&lines, 1), None);
    }
}
