//! Invoice lifecycle state transitions.
//!
//! This module implements the core state machine for moving invoices
//! through the approval lifecycle. Transitions validate the current
//! status and their guards, then return a `LifecycleAction` the
//! persistence layer applies together with the edited field set in a
//! single row update.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::allocation::BalanceReport;
use crate::allocation::types::BALANCE_TOLERANCE;
use crate::invoice::error::InvoiceError;
use crate::invoice::roles::ActorCapabilities;
use crate::invoice::types::InvoiceStatus;

/// Lifecycle action representing a validated state transition.
///
/// Each variant captures the resulting status and the audit data the
/// persistence layer records alongside it.
#[derive(Debug, Clone)]
pub enum LifecycleAction {
    /// Approve a draft invoice.
    Approve {
        /// The new status after approval.
        new_status: InvoiceStatus,
        /// The user who approved the invoice.
        approved_by: Uuid,
        /// When the invoice was approved.
        approved_at: DateTime<Utc>,
    },
    /// Grant final approval to an approved invoice.
    FinalApprove {
        /// The new status after final approval.
        new_status: InvoiceStatus,
        /// The reviewing producer.
        finalized_by: Uuid,
        /// When final approval was granted.
        finalized_at: DateTime<Utc>,
    },
    /// Reject an approved invoice back to the submitter.
    Reject {
        /// The new status after rejection.
        new_status: InvoiceStatus,
        /// The reason for rejection.
        rejection_reason: String,
    },
    /// Resubmit a rejected invoice as a draft.
    Resubmit {
        /// The new status after resubmission.
        new_status: InvoiceStatus,
    },
}

impl LifecycleAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> InvoiceStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::FinalApprove { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Resubmit { new_status } => *new_status,
        }
    }
}

/// Stateless service for invoice lifecycle transitions.
pub struct InvoiceLifecycle;

impl InvoiceLifecycle {
    /// Approve a draft invoice.
    ///
    /// The allocation balance guard applies unless the actor carries
    /// the `skip_balance_check` capability (producers working the
    /// review queue, where the prior approved state already implied a
    /// balance check).
    ///
    /// # Errors
    ///
    /// * `InvoiceError::InvalidTransition` if not in Draft status
    /// * `InvoiceError::Unbalanced` naming the exact remainder when the
    ///   guard applies and allocations do not cover the net amount
    pub fn approve(
        current_status: InvoiceStatus,
        balance: &BalanceReport,
        capabilities: ActorCapabilities,
        approved_by: Uuid,
    ) -> Result<LifecycleAction, InvoiceError> {
        if current_status != InvoiceStatus::Draft {
            return Err(InvoiceError::InvalidTransition {
                from: current_status,
                to: InvoiceStatus::Approved,
            });
        }

        if !capabilities.skip_balance_check && !balance.is_balanced {
            return Err(InvoiceError::Unbalanced {
                unallocated: balance.unallocated,
                tolerance: BALANCE_TOLERANCE,
            });
        }

        Ok(LifecycleAction::Approve {
            new_status: InvoiceStatus::Approved,
            approved_by,
            approved_at: Utc::now(),
        })
    }

    /// Grant final approval to an approved invoice.
    ///
    /// A pure decision: no numeric guard beyond the required role,
    /// which the caller has already verified.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidTransition` if not in Approved status.
    pub fn final_approve(
        current_status: InvoiceStatus,
        finalized_by: Uuid,
    ) -> Result<LifecycleAction, InvoiceError> {
        match current_status {
            InvoiceStatus::Approved => Ok(LifecycleAction::FinalApprove {
                new_status: InvoiceStatus::FinalApproved,
                finalized_by,
                finalized_at: Utc::now(),
            }),
            _ => Err(InvoiceError::InvalidTransition {
                from: current_status,
                to: InvoiceStatus::FinalApproved,
            }),
        }
    }

    /// Reject an approved invoice back to the submitter.
    ///
    /// # Errors
    ///
    /// * `InvoiceError::InvalidTransition` if not in Approved status
    /// * `InvoiceError::RejectionReasonRequired` if the reason is blank
    pub fn reject(
        current_status: InvoiceStatus,
        rejection_reason: String,
    ) -> Result<LifecycleAction, InvoiceError> {
        if rejection_reason.trim().is_empty() {
            return Err(InvoiceError::RejectionReasonRequired);
        }

        match current_status {
            InvoiceStatus::Approved => Ok(LifecycleAction::Reject {
                new_status: InvoiceStatus::Rejected,
                rejection_reason,
            }),
            _ => Err(InvoiceError::InvalidTransition {
                from: current_status,
                to: InvoiceStatus::Rejected,
            }),
        }
    }

    /// Resubmit a rejected invoice, re-entering the normal approval path.
    ///
    /// The rejection reason stays on the record until the next
    /// successful approval clears it.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidTransition` if not in Rejected status.
    pub fn resubmit(current_status: InvoiceStatus) -> Result<LifecycleAction, InvoiceError> {
        match current_status {
            InvoiceStatus::Rejected => Ok(LifecycleAction::Resubmit {
                new_status: InvoiceStatus::Draft,
            }),
            _ => Err(InvoiceError::InvalidTransition {
                from: current_status,
                to: InvoiceStatus::Draft,
            }),
        }
    }

    /// Check that an invoice still accepts field edits or allocation changes.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvoiceLocked` for final-approved invoices.
    pub const fn ensure_editable(current_status: InvoiceStatus) -> Result<(), InvoiceError> {
        if current_status.is_locked() {
            return Err(InvoiceError::InvoiceLocked);
        }
        Ok(())
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → Approved (approve)
    /// - Approved → FinalApproved (finalize)
    /// - Approved → Rejected (reject)
    /// - Rejected → Draft (resubmit)
    ///
    /// FinalApproved has no outgoing transitions.
    #[must_use]
    pub const fn is_valid_transition(from: InvoiceStatus, to: InvoiceStatus) -> bool {
        matches!(
            (from, to),
            (InvoiceStatus::Draft, InvoiceStatus::Approved)
                | (
                    InvoiceStatus::Approved,
                    InvoiceStatus::FinalApproved | InvoiceStatus::Rejected
                )
                | (InvoiceStatus::Rejected, InvoiceStatus::Draft)
        )
    }
}
