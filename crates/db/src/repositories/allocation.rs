//! Allocation repository for invoice-to-budget-line allocations.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use uuid::Uuid;

use callsheet_core::allocation::{
    AllocationError, BalanceReport, Preselection, Reconciler, SUGGESTION_HISTORY_LIMIT, preselect,
};
use callsheet_core::invoice::InvoiceStatus;

use crate::entities::{budget_lines, invoice_allocations, invoices};

/// An allocation joined with the budget line it charges.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationWithLine {
    /// Allocation record.
    pub allocation: invoice_allocations::Model,
    /// The charged budget line.
    pub line: budget_lines::Model,
}

/// Suggested budget lines for a vendor, with the workflow preselection.
#[derive(Debug, Clone, Serialize)]
pub struct VendorSuggestions {
    /// Distinct budget lines used by the vendor's recent invoices.
    pub lines: Vec<budget_lines::Model>,
    /// Pre-selected top suggestion, amount forced to zero.
    pub preselected: Option<Preselection>,
}

/// Allocation repository: add, remove, reconcile, suggest.
#[derive(Debug, Clone)]
pub struct AllocationRepository {
    db: DatabaseConnection,
}

impl AllocationRepository {
    /// Creates a new allocation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds an allocation charging part of an invoice against a budget line.
    ///
    /// No per-line or per-invoice cap applies; over-allocation shows up
    /// as a negative remaining amount on the line.
    ///
    /// # Errors
    ///
    /// * `AllocationError::NonPositiveAmount` when the amount is zero or negative
    /// * `AllocationError::InvoiceLocked` for final-approved invoices
    /// * `AllocationError::InvoiceNotFound` / `BudgetLineNotFound` for dangling ids
    pub async fn add(
        &self,
        invoice_id: Uuid,
        budget_line_id: Uuid,
        amount: Decimal,
        created_by: Uuid,
    ) -> Result<invoice_allocations::Model, AllocationError> {
        Reconciler::validate_amount(amount)?;

        let invoice = self.find_invoice(invoice_id).await?;
        ensure_unlocked(&invoice)?;

        budget_lines::Entity::find_by_id(budget_line_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(AllocationError::BudgetLineNotFound(budget_line_id))?;

        let allocation = invoice_allocations::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            budget_line_id: Set(budget_line_id),
            amount: Set(amount),
            created_by: Set(created_by),
            created_at: Set(Utc::now().into()),
        };
        allocation.insert(&self.db).await.map_err(db_err)
    }

    /// Removes an allocation. Unconditional hard delete; no void
    /// history is kept.
    ///
    /// # Errors
    ///
    /// * `AllocationError::NotFound` when the allocation does not exist
    /// * `AllocationError::InvoiceLocked` for final-approved invoices
    pub async fn remove(&self, allocation_id: Uuid) -> Result<(), AllocationError> {
        let allocation = invoice_allocations::Entity::find_by_id(allocation_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(AllocationError::NotFound(allocation_id))?;

        let invoice = self.find_invoice(allocation.invoice_id).await?;
        ensure_unlocked(&invoice)?;

        allocation.delete(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    /// Looks up the invoice an allocation belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::NotFound` when the allocation does not
    /// exist.
    pub async fn invoice_id_of(&self, allocation_id: Uuid) -> Result<Uuid, AllocationError> {
        let invoice_id: Option<Uuid> = invoice_allocations::Entity::find_by_id(allocation_id)
            .select_only()
            .column(invoice_allocations::Column::InvoiceId)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(db_err)?;
        invoice_id.ok_or(AllocationError::NotFound(allocation_id))
    }

    /// Lists an invoice's allocations joined with their budget lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_with_lines(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<AllocationWithLine>, AllocationError> {
        let rows = invoice_allocations::Entity::find()
            .filter(invoice_allocations::Column::InvoiceId.eq(invoice_id))
            .find_also_related(budget_lines::Entity)
            .order_by_asc(invoice_allocations::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let result = rows
            .into_iter()
            .filter_map(|(allocation, line)| {
                line.map(|line| AllocationWithLine { allocation, line })
            })
            .collect();
        Ok(result)
    }

    /// Reconciles an invoice's allocations against its net amount.
    ///
    /// An invoice with no net amount yet reconciles against zero.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::InvoiceNotFound` when the invoice does
    /// not exist.
    pub async fn balance(&self, invoice_id: Uuid) -> Result<BalanceReport, AllocationError> {
        let invoice = self.find_invoice(invoice_id).await?;

        let amounts: Vec<Decimal> = invoice_allocations::Entity::find()
            .filter(invoice_allocations::Column::InvoiceId.eq(invoice_id))
            .select_only()
            .column(invoice_allocations::Column::Amount)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let net = invoice.amount_without_vat.unwrap_or(Decimal::ZERO);
        Ok(Reconciler::compute_balance(net, &amounts))
    }

    /// Suggests budget lines for a vendor based on the allocations of
    /// its most recent invoices within the same project.
    ///
    /// `invoice_id` names the invoice being allocated, when there is
    /// one: it is excluded from the vendor's history, and the
    /// preselection policy applies when it has no allocations yet (the
    /// top suggestion is pre-selected with its amount forced to zero).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn suggest_for_vendor(
        &self,
        project_id: Uuid,
        normalized_ico: &str,
        invoice_id: Option<Uuid>,
    ) -> Result<VendorSuggestions, AllocationError> {
        if normalized_ico.is_empty() {
            return Ok(VendorSuggestions {
                lines: vec![],
                preselected: None,
            });
        }

        // The vendor's most recent invoices in this project, excluding
        // the one being allocated.
        let mut recent = invoices::Entity::find()
            .filter(invoices::Column::ProjectId.eq(project_id))
            .filter(invoices::Column::Ico.eq(normalized_ico));
        if let Some(invoice_id) = invoice_id {
            recent = recent.filter(invoices::Column::Id.ne(invoice_id));
        }
        let recent_ids: Vec<Uuid> = recent
            .order_by_desc(invoices::Column::CreatedAt)
            .limit(SUGGESTION_HISTORY_LIMIT)
            .select_only()
            .column(invoices::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        if recent_ids.is_empty() {
            return Ok(VendorSuggestions {
                lines: vec![],
                preselected: None,
            });
        }

        let line_ids: Vec<Uuid> = invoice_allocations::Entity::find()
            .filter(invoice_allocations::Column::InvoiceId.is_in(recent_ids))
            .order_by_desc(invoice_allocations::Column::CreatedAt)
            .select_only()
            .column(invoice_allocations::Column::BudgetLineId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut distinct_ids: Vec<Uuid> = Vec::new();
        for id in line_ids {
            if !distinct_ids.contains(&id) {
                distinct_ids.push(id);
            }
        }

        let mut lines = budget_lines::Entity::find()
            .filter(budget_lines::Column::Id.is_in(distinct_ids.clone()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        // Keep most-recently-used first.
        lines.sort_by_key(|line| {
            distinct_ids
                .iter()
                .position(|id| *id == line.id)
                .unwrap_or(usize::MAX)
        });

        let existing_count = match invoice_id {
            Some(invoice_id) => invoice_allocations::Entity::find()
                .filter(invoice_allocations::Column::InvoiceId.eq(invoice_id))
                .count(&self.db)
                .await
                .map_err(db_err)?,
            None => 0,
        };

        let ordered_ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();
        let preselected = preselect(
            &ordered_ids,
            usize::try_from(existing_count).unwrap_or(usize::MAX),
        );

        Ok(VendorSuggestions { lines, preselected })
    }

    async fn find_invoice(&self, invoice_id: Uuid) -> Result<invoices::Model, AllocationError> {
        invoices::Entity::find_by_id(invoice_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(AllocationError::InvoiceNotFound(invoice_id))
    }
}

/// Allocation changes are blocked once an invoice is final-approved.
fn ensure_unlocked(invoice: &invoices::Model) -> Result<(), AllocationError> {
    let status: InvoiceStatus = invoice.status.into();
    if status.is_locked() {
        return Err(AllocationError::InvoiceLocked);
    }
    Ok(())
}

fn db_err(err: DbErr) -> AllocationError {
    AllocationError::Database(err.to_string())
}
