//! Property-based tests for the invoice lifecycle state machine.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::allocation::Reconciler;
use crate::invoice::error::InvoiceError;
use crate::invoice::lifecycle::InvoiceLifecycle;
use crate::invoice::roles::ActorCapabilities;
use crate::invoice::types::InvoiceStatus;

/// Strategy for generating any invoice status.
fn arb_status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Draft),
        Just(InvoiceStatus::Approved),
        Just(InvoiceStatus::FinalApproved),
        Just(InvoiceStatus::Rejected),
    ]
}

/// Strategy for generating amounts with two decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// FinalApproved never has an outgoing transition.
    #[test]
    fn prop_final_approved_is_terminal(to in arb_status()) {
        prop_assert!(!InvoiceLifecycle::is_valid_transition(
            InvoiceStatus::FinalApproved,
            to,
        ));
    }

    /// Every action that succeeds lands on a status reachable per the
    /// transition table from the status it started at.
    #[test]
    fn prop_successful_actions_follow_the_table(from in arb_status()) {
        let user = Uuid::new_v4();
        let balance = Reconciler::compute_balance(Decimal::ZERO, &[]);

        if let Ok(action) =
            InvoiceLifecycle::approve(from, &balance, ActorCapabilities::none(), user)
        {
            prop_assert!(InvoiceLifecycle::is_valid_transition(from, action.new_status()));
        }
        if let Ok(action) = InvoiceLifecycle::final_approve(from, user) {
            prop_assert!(InvoiceLifecycle::is_valid_transition(from, action.new_status()));
        }
        if let Ok(action) = InvoiceLifecycle::reject(from, "reason".to_string()) {
            prop_assert!(InvoiceLifecycle::is_valid_transition(from, action.new_status()));
        }
        if let Ok(action) = InvoiceLifecycle::resubmit(from) {
            prop_assert!(InvoiceLifecycle::is_valid_transition(from, action.new_status()));
        }
    }

    /// The balance guard on draft approval is exact: any shortfall
    /// above tolerance is refused and the error names the remainder;
    /// the producer capability bypasses the same shortfall.
    #[test]
    fn prop_balance_guard_matches_report(
        net in arb_amount(),
        allocated in arb_amount(),
    ) {
        let report = Reconciler::compute_balance(net, &[allocated]);
        let result = InvoiceLifecycle::approve(
            InvoiceStatus::Draft,
            &report,
            ActorCapabilities::none(),
            Uuid::new_v4(),
        );

        if report.is_balanced {
            prop_assert!(result.is_ok());
        } else {
            match result {
                Err(InvoiceError::Unbalanced { unallocated, .. }) => {
                    prop_assert_eq!(unallocated, report.unallocated);
                }
                other => return Err(TestCaseError::fail(format!("expected Unbalanced, got {other:?}"))),
            }
        }

        // The fast path ignores the report entirely.
        let skipped = InvoiceLifecycle::approve(
            InvoiceStatus::Draft,
            &report,
            ActorCapabilities { skip_balance_check: true },
            Uuid::new_v4(),
        );
        prop_assert!(skipped.is_ok());
    }
}
