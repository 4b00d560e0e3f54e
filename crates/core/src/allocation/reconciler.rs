//! Balance computation and allocation validation.

use rust_decimal::Decimal;

use super::error::AllocationError;
use super::types::{BALANCE_TOLERANCE, BalanceReport};

/// Stateless reconciler for invoice allocations.
pub struct Reconciler;

impl Reconciler {
    /// Reconciles allocation amounts against the invoice net amount.
    ///
    /// An invoice with no net amount yet (extraction returned null)
    /// reconciles against zero, so it is balanced only when nothing
    /// has been allocated.
    #[must_use]
    pub fn compute_balance(amount_without_vat: Decimal, allocations: &[Decimal]) -> BalanceReport {
        let total_allocated: Decimal = allocations.iter().copied().sum();
        let unallocated = amount_without_vat - total_allocated;

        BalanceReport {
            total_allocated,
            unallocated,
            is_balanced: unallocated.abs() <= BALANCE_TOLERANCE,
        }
    }

    /// Validates a new allocation amount.
    ///
    /// There is deliberately no per-line or per-invoice cap here:
    /// over-allocating a budget line is surfaced through its negative
    /// remaining amount, never blocked.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::NonPositiveAmount` when the amount is
    /// zero or negative.
    pub fn validate_amount(amount: Decimal) -> Result<(), AllocationError> {
        if amount <= Decimal::ZERO {
            return Err(AllocationError::NonPositiveAmount { amount });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balanced_exact() {
        let report = Reconciler::compute_balance(dec!(1000), &[dec!(600), dec!(400)]);
        assert_eq!(report.total_allocated, dec!(1000));
        assert_eq!(report.unallocated, dec!(0));
        assert!(report.is_balanced);
    }

    #[test]
    fn test_balanced_within_tolerance() {
        let report = Reconciler::compute_balance(dec!(1000), &[dec!(999.5)]);
        assert_eq!(report.unallocated, dec!(0.5));
        assert!(report.is_balanced);

        let over = Reconciler::compute_balance(dec!(1000), &[dec!(1001)]);
        assert_eq!(over.unallocated, dec!(-1));
        assert!(over.is_balanced);
    }

    #[test]
    fn test_unbalanced_beyond_tolerance() {
        let report = Reconciler::compute_balance(dec!(1000), &[dec!(800)]);
        assert_eq!(report.total_allocated, dec!(800));
        assert_eq!(report.unallocated, dec!(200));
        assert!(!report.is_balanced);

        let just_over = Reconciler::compute_balance(dec!(1000), &[dec!(998.99)]);
        assert_eq!(just_over.unallocated, dec!(1.01));
        assert!(!just_over.is_balanced);
    }

    #[test]
    fn test_no_allocations() {
        let report = Reconciler::compute_balance(dec!(500), &[]);
        assert_eq!(report.total_allocated, dec!(0));
        assert_eq!(report.unallocated, dec!(500));
        assert!(!report.is_balanced);
    }

    #[test]
    fn test_zero_net_amount_with_no_allocations_is_balanced() {
        let report = Reconciler::compute_balance(dec!(0), &[]);
        assert!(report.is_balanced);
    }

    #[test]
    fn test_validate_amount_positive() {
        assert!(Reconciler::validate_amount(dec!(0.01)).is_ok());
        assert!(Reconciler::validate_amount(dec!(50000)).is_ok());
    }

    #[test]
    fn test_validate_amount_rejects_zero_and_negative() {
        assert!(matches!(
            Reconciler::validate_amount(dec!(0)),
            Err(AllocationError::NonPositiveAmount { .. })
        ));
        assert!(matches!(
            Reconciler::validate_amount(dec!(-10)),
            Err(AllocationError::NonPositiveAmount { .. })
        ));
    }
}
