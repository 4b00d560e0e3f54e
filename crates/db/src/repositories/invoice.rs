//! Invoice repository for invoice persistence and lifecycle writes.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set,
    Statement, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use callsheet_core::dedup::InvoiceKey;
use callsheet_core::ingest::{DraftInvoice, IngestError, InvoiceGateway};
use callsheet_core::invoice::{InvoiceError, InvoiceFields, InvoiceLifecycle, LifecycleAction};

use crate::entities::{invoices, sea_orm_active_enums::InvoiceStatus};

/// Invoice list row, projected without the stored document bytes.
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct InvoiceSummary {
    /// Invoice id.
    pub id: Uuid,
    /// Owning project, if attached.
    pub project_id: Option<Uuid>,
    /// Project-scoped sequence number.
    pub internal_id: Option<i32>,
    /// Submitting user.
    pub user_id: Uuid,
    /// Lifecycle status.
    pub status: InvoiceStatus,
    /// Vendor IČO, normalized.
    pub ico: Option<String>,
    /// Vendor company name.
    pub company_name: Option<String>,
    /// Variable symbol, normalized.
    pub variable_symbol: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Gross amount.
    pub amount_with_vat: Option<rust_decimal::Decimal>,
    /// Net amount.
    pub amount_without_vat: Option<rust_decimal::Decimal>,
    /// ISO currency code.
    pub currency: Option<String>,
    /// Extraction confidence.
    pub confidence: Option<f32>,
    /// Rejection reason, when status is rejected.
    pub rejection_reason: Option<String>,
    /// Original file name.
    pub file_name: String,
    /// Creation timestamp.
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Columns shared by all summary projections.
const SUMMARY_COLUMNS: [invoices::Column; 16] = [
    invoices::Column::Id,
    invoices::Column::ProjectId,
    invoices::Column::InternalId,
    invoices::Column::UserId,
    invoices::Column::Status,
    invoices::Column::Ico,
    invoices::Column::CompanyName,
    invoices::Column::VariableSymbol,
    invoices::Column::Description,
    invoices::Column::AmountWithVat,
    invoices::Column::AmountWithoutVat,
    invoices::Column::Currency,
    invoices::Column::Confidence,
    invoices::Column::RejectionReason,
    invoices::Column::FileName,
    invoices::Column::CreatedAt,
];

/// Invoice repository: drafts, lifecycle writes, and lazy file content.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets an invoice by id, including the stored document bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` when the invoice does not exist.
    pub async fn find_by_id(&self, invoice_id: Uuid) -> Result<invoices::Model, InvoiceError> {
        invoices::Entity::find_by_id(invoice_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(InvoiceError::NotFound(invoice_id))
    }

    /// Lists a project's invoices, newest first, without file content.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<InvoiceSummary>, InvoiceError> {
        invoices::Entity::find()
            .filter(invoices::Column::ProjectId.eq(project_id))
            .select_only()
            .columns(SUMMARY_COLUMNS)
            .order_by_desc(invoices::Column::CreatedAt)
            .into_model::<InvoiceSummary>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists unattached invoices (the global inbox), newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_inbox(&self) -> Result<Vec<InvoiceSummary>, InvoiceError> {
        invoices::Entity::find()
            .filter(invoices::Column::ProjectId.is_null())
            .select_only()
            .columns(SUMMARY_COLUMNS)
            .order_by_desc(invoices::Column::CreatedAt)
            .into_model::<InvoiceSummary>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Fetches the stored document bytes for one invoice.
    ///
    /// This is the deliberately lazy path: list rendering never touches
    /// the binary column, previews fetch it on demand.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` when the invoice does not exist.
    pub async fn file_content(&self, invoice_id: Uuid) -> Result<Vec<u8>, InvoiceError> {
        let content: Option<Vec<u8>> = invoices::Entity::find_by_id(invoice_id)
            .select_only()
            .column(invoices::Column::FileContent)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(db_err)?;
        content.ok_or(InvoiceError::NotFound(invoice_id))
    }

    /// Saves edited fields on an invoice without changing its status.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvoiceLocked` for final-approved invoices
    /// and `InvoiceError::NotFound` when the invoice does not exist.
    pub async fn update_fields(
        &self,
        invoice_id: Uuid,
        fields: InvoiceFields,
    ) -> Result<invoices::Model, InvoiceError> {
        let invoice = self.find_by_id(invoice_id).await?;
        InvoiceLifecycle::ensure_editable(invoice.status.into())?;

        let mut active: invoices::ActiveModel = invoice.into();
        set_fields(&mut active, fields.normalized());
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Applies a validated lifecycle transition together with the
    /// actor's edited fields, as a single row update.
    ///
    /// Failure of the update leaves the invoice in its prior status;
    /// there is no partial commit.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` when the invoice does not exist,
    /// `InvoiceError::InvoiceLocked` when the row has already reached
    /// final approval, or a database error if the update fails.
    pub async fn apply_transition(
        &self,
        invoice_id: Uuid,
        action: LifecycleAction,
        fields: InvoiceFields,
    ) -> Result<invoices::Model, InvoiceError> {
        let invoice = self.find_by_id(invoice_id).await?;
        InvoiceLifecycle::ensure_editable(invoice.status.into())?;

        let mut active: invoices::ActiveModel = invoice.into();
        set_fields(&mut active, fields.normalized());
        active.status = Set(action.new_status().into());

        match action {
            LifecycleAction::Approve {
                approved_by,
                approved_at,
                ..
            } => {
                active.approved_by = Set(Some(approved_by));
                active.approved_at = Set(Some(approved_at.into()));
                // A successful approval closes the rejection loop.
                active.rejection_reason = Set(None);
            }
            LifecycleAction::FinalApprove {
                finalized_by,
                finalized_at,
                ..
            } => {
                active.finalized_by = Set(Some(finalized_by));
                active.finalized_at = Set(Some(finalized_at.into()));
            }
            LifecycleAction::Reject {
                rejection_reason, ..
            } => {
                active.rejection_reason = Set(Some(rejection_reason));
            }
            LifecycleAction::Resubmit { .. } => {}
        }

        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Attaches an inbox invoice to a project, assigning its
    /// project-scoped internal id.
    ///
    /// The internal id is immutable once assigned: attaching an invoice
    /// that already belongs to a project is refused rather than
    /// renumbering it.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::AlreadyAttached` when the invoice already
    /// has a project, `InvoiceError::InvoiceLocked` for final-approved
    /// invoices, and `InvoiceError::NotFound` when the invoice does not
    /// exist.
    pub async fn attach_to_project(
        &self,
        invoice_id: Uuid,
        project_id: Uuid,
    ) -> Result<invoices::Model, InvoiceError> {
        let invoice = self.find_by_id(invoice_id).await?;
        if invoice.project_id.is_some() || invoice.internal_id.is_some() {
            return Err(InvoiceError::AlreadyAttached);
        }
        InvoiceLifecycle::ensure_editable(invoice.status.into())?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let internal_id = next_internal_id(&txn, project_id).await.map_err(db_err)?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.project_id = Set(Some(project_id));
        active.internal_id = Set(Some(internal_id));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Persists a draft invoice, assigning an internal id when the
    /// draft targets a project.
    async fn insert_draft(&self, draft: DraftInvoice) -> Result<invoices::Model, DbErr> {
        let txn = self.db.begin().await?;

        let internal_id = match draft.project_id {
            Some(project_id) => Some(next_internal_id(&txn, project_id).await?),
            None => None,
        };

        let now = Utc::now().into();
        let fields = draft.fields;
        let invoice = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(draft.project_id),
            internal_id: Set(internal_id),
            user_id: Set(draft.user_id),
            status: Set(InvoiceStatus::Draft),
            ico: Set(fields.ico),
            company_name: Set(fields.company_name),
            bank_account: Set(fields.bank_account),
            iban: Set(fields.iban),
            variable_symbol: Set(fields.variable_symbol),
            description: Set(fields.description),
            amount_with_vat: Set(fields.amount_with_vat),
            amount_without_vat: Set(fields.amount_without_vat),
            currency: Set(fields.currency),
            confidence: Set(draft.confidence),
            raw_text: Set(draft.raw_text),
            rejection_reason: Set(None),
            file_name: Set(draft.file_name),
            mime_type: Set(draft.mime_type),
            file_content: Set(draft.file_content),
            approved_by: Set(None),
            approved_at: Set(None),
            finalized_by: Set(None),
            finalized_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = invoice.insert(&txn).await?;

        txn.commit().await?;
        Ok(created)
    }
}

impl InvoiceGateway for InvoiceRepository {
    async fn existing_keys(
        &self,
        project_id: Option<Uuid>,
    ) -> Result<Vec<InvoiceKey>, IngestError> {
        let mut query = invoices::Entity::find()
            .select_only()
            .column(invoices::Column::Ico)
            .column(invoices::Column::VariableSymbol)
            .column(invoices::Column::AmountWithVat);
        query = match project_id {
            Some(id) => query.filter(invoices::Column::ProjectId.eq(id)),
            None => query.filter(invoices::Column::ProjectId.is_null()),
        };

        let rows: Vec<(Option<String>, Option<String>, Option<rust_decimal::Decimal>)> = query
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| IngestError::Gateway(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(ico, variable_symbol, amount_with_vat)| InvoiceKey {
                ico,
                variable_symbol,
                amount_with_vat,
            })
            .collect())
    }

    async fn create_draft(&self, draft: DraftInvoice) -> Result<Uuid, IngestError> {
        let created = self
            .insert_draft(draft)
            .await
            .map_err(|e| IngestError::Gateway(e.to_string()))?;
        Ok(created.id)
    }
}

/// Computes the next internal id for a project inside a transaction.
///
/// Read-max-then-insert races under concurrent submission, so the read
/// is serialized on a per-project advisory lock held for the rest of
/// the transaction.
async fn next_internal_id(txn: &DatabaseTransaction, project_id: Uuid) -> Result<i32, DbErr> {
    txn.execute_raw(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [advisory_key(project_id).into()],
    ))
    .await?;

    let max: Option<Option<i32>> = invoices::Entity::find()
        .filter(invoices::Column::ProjectId.eq(project_id))
        .select_only()
        .column_as(invoices::Column::InternalId.max(), "max_internal_id")
        .into_tuple()
        .one(txn)
        .await?;

    Ok(max.flatten().unwrap_or(0) + 1)
}

/// Derives a stable advisory-lock key from a project id.
fn advisory_key(project_id: Uuid) -> i64 {
    let bytes = project_id.as_bytes();
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&bytes[8..]);
    i64::from_be_bytes(tail)
}

/// Writes the full edited field set onto an active model.
fn set_fields(active: &mut invoices::ActiveModel, fields: InvoiceFields) {
    active.ico = Set(fields.ico);
    active.company_name = Set(fields.company_name);
    active.bank_account = Set(fields.bank_account);
    active.iban = Set(fields.iban);
    active.variable_symbol = Set(fields.variable_symbol);
    active.description = Set(fields.description);
    active.amount_with_vat = Set(fields.amount_with_vat);
    active.amount_without_vat = Set(fields.amount_without_vat);
    active.currency = Set(fields.currency);
}

fn db_err(err: DbErr) -> InvoiceError {
    InvoiceError::Database(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_key_is_stable_per_project() {
        let project = Uuid::new_v4();
        assert_eq!(advisory_key(project), advisory_key(project));
        assert_ne!(advisory_key(project), advisory_key(Uuid::new_v4()));
    }
}
