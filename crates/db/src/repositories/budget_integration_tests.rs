//! Integration tests for the budget activation swap.
//!
//! Runs the repository against a mocked Postgres connection and checks
//! the statements it issues: parse-before-persist on upload, new
//! versions created inactive, and deactivate-all-then-activate-one
//! inside a single transaction.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::entities::{budget_lines, budgets};
    use crate::repositories::budget::{BudgetError, BudgetRepository, UploadBudgetInput};

    fn budget(project_id: Uuid, is_active: bool) -> budgets::Model {
        budgets::Model {
            id: Uuid::new_v4(),
            project_id,
            version_name: "rev-1".to_string(),
            source_content: String::new(),
            is_active,
            uploaded_by: Uuid::new_v4(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_activate_deactivates_all_before_activating_one() {
        let project_id = Uuid::new_v4();
        let target = budget(project_id, false);
        let mut activated = target.clone();
        activated.is_active = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![target.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .append_query_results([vec![activated]])
            .into_connection();

        let repo = BudgetRepository::new(db.clone());
        repo.activate(project_id, target.id).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        let first = log.find("UPDATE \"budgets\"").unwrap();
        let second = log.rfind("UPDATE \"budgets\"").unwrap();
        assert!(first < second, "the swap issues two update statements");
        assert!(
            !log[first..second].contains("RETURNING"),
            "deactivate-all must run before the single-row activate"
        );
        assert!(
            log[second..].contains("RETURNING"),
            "the activate is a single-row update"
        );
    }

    #[tokio::test]
    async fn test_activate_refuses_budget_outside_project() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<budgets::Model>::new()])
            .into_connection();

        let repo = BudgetRepository::new(db.clone());
        let budget_id = Uuid::new_v4();
        let result = repo.activate(Uuid::new_v4(), budget_id).await;

        assert!(matches!(result, Err(BudgetError::NotFound(id)) if id == budget_id));
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("UPDATE"), "a failed lookup writes nothing");
    }

    #[tokio::test]
    async fn test_upload_rejects_unusable_source_before_any_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = BudgetRepository::new(db.clone());

        let result = repo
            .upload(UploadBudgetInput {
                project_id: Uuid::new_v4(),
                version_name: "rev-1".to_string(),
                source_content: "account_number,category_number,amount\n,,\n".to_string(),
                uploaded_by: Uuid::new_v4(),
            })
            .await;

        assert!(matches!(result, Err(BudgetError::Parse(_))));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_upload_creates_the_new_version_inactive() {
        let project_id = Uuid::new_v4();
        let created = budget(project_id, false);
        let line = budget_lines::Model {
            id: Uuid::new_v4(),
            budget_id: created.id,
            account_number: "1101".to_string(),
            account_description: "Director fee".to_string(),
            category_number: "11".to_string(),
            category_description: String::new(),
            original_amount: dec!(500000),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![created]])
            .append_query_results([vec![line]])
            .into_connection();

        let repo = BudgetRepository::new(db.clone());
        repo.upload(UploadBudgetInput {
            project_id,
            version_name: "rev-1".to_string(),
            source_content:
                "account_number,account_description,category_number,amount\n1101,Director fee,11,500000\n"
                    .to_string(),
            uploaded_by: Uuid::new_v4(),
        })
        .await
        .unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("INSERT INTO \"budgets\""));
        assert!(
            log.contains("Bool(Some(false))"),
            "new versions start inactive; activation is a separate step"
        );
    }
}
