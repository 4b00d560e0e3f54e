//! Property-based tests for the allocation reconciler.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::allocation::reconciler::Reconciler;
use crate::allocation::types::BALANCE_TOLERANCE;

/// Strategy for amounts with two decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a small set of allocation amounts.
fn arb_allocations() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(arb_amount(), 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Balanced iff |sum(allocations) - net| <= tolerance.
    #[test]
    fn prop_balanced_iff_within_tolerance(
        net in arb_amount(),
        allocations in arb_allocations(),
    ) {
        let report = Reconciler::compute_balance(net, &allocations);
        let total: Decimal = allocations.iter().copied().sum();

        prop_assert_eq!(report.total_allocated, total);
        prop_assert_eq!(report.unallocated, net - total);
        prop_assert_eq!(
            report.is_balanced,
            (net - total).abs() <= BALANCE_TOLERANCE
        );
    }

    /// Adding an allocation moves the unallocated remainder by exactly
    /// the allocation's amount; removing it moves it back.
    #[test]
    fn prop_add_remove_moves_remainder_exactly(
        net in arb_amount(),
        mut allocations in arb_allocations(),
        added in arb_amount(),
    ) {
        let before = Reconciler::compute_balance(net, &allocations);

        allocations.push(added);
        let after = Reconciler::compute_balance(net, &allocations);
        prop_assert_eq!(after.unallocated, before.unallocated - added);

        allocations.pop();
        let restored = Reconciler::compute_balance(net, &allocations);
        prop_assert_eq!(restored.unallocated, before.unallocated);
    }

    /// Every accepted allocation amount is strictly positive.
    #[test]
    fn prop_validate_amount_sign(amount in -10_000_000i64..10_000_000i64) {
        let amount = Decimal::new(amount, 2);
        let result = Reconciler::validate_amount(amount);
        prop_assert_eq!(result.is_ok(), amount > Decimal::ZERO);
    }
}
