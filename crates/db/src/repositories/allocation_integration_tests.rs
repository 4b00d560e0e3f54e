//! Integration tests for vendor suggestion scoping.
//!
//! Runs the repository against a mocked Postgres connection and checks
//! the history query: same project, same vendor, capped at the recent
//! window, excluding only the invoice currently being allocated.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use uuid::Uuid;

    use crate::repositories::allocation::AllocationRepository;

    fn empty_history() -> Vec<BTreeMap<&'static str, Value>> {
        Vec::new()
    }

    #[tokio::test]
    async fn test_blank_ico_returns_empty_without_querying() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = AllocationRepository::new(db.clone());

        let suggestions = repo
            .suggest_for_vendor(Uuid::from_u128(0x50), "", None)
            .await
            .unwrap();

        assert!(suggestions.lines.is_empty());
        assert!(suggestions.preselected.is_none());
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_scoped_to_project_vendor_and_recent_window() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([empty_history()])
            .into_connection();
        let repo = AllocationRepository::new(db.clone());

        let suggestions = repo
            .suggest_for_vendor(
                Uuid::from_u128(0x51),
                "12345678",
                Some(Uuid::from_u128(0x52)),
            )
            .await
            .unwrap();

        assert!(suggestions.lines.is_empty());
        assert!(suggestions.preselected.is_none());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("\"project_id\""));
        assert!(log.contains("\"ico\""));
        assert!(log.contains("12345678"));
        assert!(log.contains("LIMIT"), "history must be capped");
        assert!(
            log.contains("BigUnsigned(Some(15))"),
            "the cap is the vendor's 15 most recent invoices"
        );
        assert!(
            log.contains("<>"),
            "the invoice being allocated is excluded from its own history"
        );
    }

    #[tokio::test]
    async fn test_history_keeps_all_vendor_invoices_without_a_current_invoice() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([empty_history()])
            .into_connection();
        let repo = AllocationRepository::new(db.clone());

        repo.suggest_for_vendor(Uuid::from_u128(0x53), "12345678", None)
            .await
            .unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(
            !log.contains("<>"),
            "no exclusion filter applies without a current invoice"
        );
    }
}
