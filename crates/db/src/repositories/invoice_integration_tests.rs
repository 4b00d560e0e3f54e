//! Integration tests for invoice attachment and internal numbering.
//!
//! Runs the repository against a mocked Postgres connection: the
//! project-scoped number is taken under the advisory lock and is always
//! the current maximum plus one, numbers are never reassigned, and
//! lifecycle writes refuse final-approved rows.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use uuid::Uuid;

    use callsheet_core::invoice::{
        InvoiceError, InvoiceFields, InvoiceLifecycle, InvoiceStatus as CoreInvoiceStatus,
    };

    use crate::entities::{invoices, sea_orm_active_enums::InvoiceStatus};
    use crate::repositories::invoice::InvoiceRepository;

    fn inbox_invoice(status: InvoiceStatus) -> invoices::Model {
        invoices::Model {
            id: Uuid::new_v4(),
            project_id: None,
            internal_id: None,
            user_id: Uuid::new_v4(),
            status,
            ico: None,
            company_name: None,
            bank_account: None,
            iban: None,
            variable_symbol: None,
            description: None,
            amount_with_vat: None,
            amount_without_vat: None,
            currency: None,
            confidence: None,
            raw_text: None,
            rejection_reason: None,
            file_name: "scan.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            file_content: vec![],
            approved_by: None,
            approved_at: None,
            finalized_by: None,
            finalized_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn max_row(max: Option<i32>) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("max_internal_id", Value::Int(max))])
    }

    #[tokio::test]
    async fn test_attach_numbers_after_the_project_maximum() {
        let invoice = inbox_invoice(InvoiceStatus::Draft);
        let project_id = Uuid::from_u128(0x4242);
        let mut attached = invoice.clone();
        attached.project_id = Some(project_id);
        attached.internal_id = Some(5);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invoice.clone()]])
            .append_query_results([vec![max_row(Some(4))]])
            .append_query_results([vec![attached]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = InvoiceRepository::new(db.clone());
        let updated = repo
            .attach_to_project(invoice.id, project_id)
            .await
            .unwrap();
        assert_eq!(updated.internal_id, Some(5));

        let log = format!("{:?}", db.into_transaction_log());
        let lock = log
            .find("pg_advisory_xact_lock")
            .expect("numbering must take the project lock");
        let max = log
            .find("MAX(")
            .expect("numbering reads the current maximum");
        assert!(lock < max, "the lock is held before the maximum is read");
        assert!(log.contains("Int(Some(5))"), "next number is max + 1");
    }

    #[tokio::test]
    async fn test_attach_numbers_the_first_invoice_from_one() {
        let invoice = inbox_invoice(InvoiceStatus::Draft);
        let project_id = Uuid::from_u128(0x07);
        let mut attached = invoice.clone();
        attached.project_id = Some(project_id);
        attached.internal_id = Some(1);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invoice.clone()]])
            .append_query_results([vec![max_row(None)]])
            .append_query_results([vec![attached]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = InvoiceRepository::new(db.clone());
        repo.attach_to_project(invoice.id, project_id)
            .await
            .unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("Int(Some(1))"), "an empty project starts at 1");
    }

    #[tokio::test]
    async fn test_attach_refuses_an_already_numbered_invoice() {
        let mut invoice = inbox_invoice(InvoiceStatus::Draft);
        invoice.project_id = Some(Uuid::from_u128(0x20));
        invoice.internal_id = Some(4);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invoice.clone()]])
            .into_connection();

        let repo = InvoiceRepository::new(db.clone());
        let result = repo
            .attach_to_project(invoice.id, Uuid::from_u128(0x21))
            .await;

        assert!(matches!(result, Err(InvoiceError::AlreadyAttached)));
        let log = format!("{:?}", db.into_transaction_log());
        assert!(
            !log.contains("UPDATE"),
            "a numbered invoice is never renumbered"
        );
    }

    #[tokio::test]
    async fn test_apply_transition_refuses_a_final_approved_row() {
        let invoice = inbox_invoice(InvoiceStatus::FinalApproved);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invoice.clone()]])
            .into_connection();

        let repo = InvoiceRepository::new(db.clone());
        let action =
            InvoiceLifecycle::final_approve(CoreInvoiceStatus::Approved, Uuid::from_u128(0x30))
                .unwrap();
        let result = repo
            .apply_transition(invoice.id, action, InvoiceFields::default())
            .await;

        assert!(matches!(result, Err(InvoiceError::InvoiceLocked)));
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("UPDATE"), "a locked row is never written");
    }
}
