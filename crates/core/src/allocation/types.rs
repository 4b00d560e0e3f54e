//! Allocation domain types.

use rust_decimal::Decimal;
use serde::Serialize;

/// How far the allocated total may drift from the invoice net amount
/// and still count as balanced: one currency unit.
///
/// VAT math on line items routinely produces sub-unit rounding drift;
/// a zero tolerance would block legitimate invoices over cents.
pub const BALANCE_TOLERANCE: Decimal = Decimal::ONE;

/// Result of reconciling an invoice's allocations against its net amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    /// Sum of all allocation amounts.
    pub total_allocated: Decimal,
    /// Net amount minus total allocated (signed).
    pub unallocated: Decimal,
    /// Whether `|unallocated|` falls within [`BALANCE_TOLERANCE`].
    pub is_balanced: bool,
}
