//! Budget repository for budget ledger operations.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use callsheet_core::budget::{BudgetLineUsage, BudgetParseError, BudgetParser};

use crate::entities::{budget_lines, budgets, invoice_allocations};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(Uuid),

    /// The uploaded source yielded no usable lines.
    #[error(transparent)]
    Parse(#[from] BudgetParseError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for uploading a budget definition.
#[derive(Debug, Clone)]
pub struct UploadBudgetInput {
    /// Owning project.
    pub project_id: Uuid,
    /// Version label shown to the team (e.g. file name or revision).
    pub version_name: String,
    /// Raw uploaded source.
    pub source_content: String,
    /// Uploading user.
    pub uploaded_by: Uuid,
}

/// Budget line with its derived spending position.
#[derive(Debug, Clone)]
pub struct BudgetLineWithUsage {
    /// Budget line record.
    pub line: budget_lines::Model,
    /// Derived spent/remaining amounts.
    pub usage: BudgetLineUsage,
}

/// Budget repository: upload, activation swap, and line lookups.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Parses and persists an uploaded budget definition.
    ///
    /// Parse-then-persist: the budget row and all its lines are inserted
    /// in one transaction, so a failed line insert rolls the budget row
    /// back too. No orphan budget with zero lines can exist.
    ///
    /// The new budget is created inactive; activation is a separate,
    /// explicit step.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Parse` when the source yields no usable
    /// lines, or a database error if persistence fails.
    pub async fn upload(&self, input: UploadBudgetInput) -> Result<budgets::Model, BudgetError> {
        let parsed = BudgetParser::parse(&input.source_content)?;

        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let budget_id = Uuid::new_v4();

        let budget = budgets::ActiveModel {
            id: Set(budget_id),
            project_id: Set(input.project_id),
            version_name: Set(input.version_name),
            source_content: Set(input.source_content),
            is_active: Set(false),
            uploaded_by: Set(input.uploaded_by),
            created_at: Set(now),
        };
        let created = budget.insert(&txn).await?;

        for line in parsed {
            let line = budget_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                budget_id: Set(budget_id),
                account_number: Set(line.account_number),
                account_description: Set(line.account_description),
                category_number: Set(line.category_number),
                category_description: Set(line.category_description),
                original_amount: Set(line.amount),
                created_at: Set(now),
            };
            line.insert(&txn).await?;
        }

        txn.commit().await?;
        Ok(created)
    }

    /// Activates one budget version for a project.
    ///
    /// Deactivate-all-then-activate-one, in a single transaction: a
    /// reader never observes zero or multiple active budgets mid-swap.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NotFound` when the budget does not belong
    /// to the project, or a database error if the swap fails.
    pub async fn activate(&self, project_id: Uuid, budget_id: Uuid) -> Result<(), BudgetError> {
        let txn = self.db.begin().await?;

        let target = budgets::Entity::find_by_id(budget_id)
            .filter(budgets::Column::ProjectId.eq(project_id))
            .one(&txn)
            .await?
            .ok_or(BudgetError::NotFound(budget_id))?;

        budgets::Entity::update_many()
            .col_expr(budgets::Column::IsActive, sea_orm::sea_query::Expr::value(false))
            .filter(budgets::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await?;

        let mut active: budgets::ActiveModel = target.into();
        active.is_active = Set(true);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Lists a project's budget versions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, project_id: Uuid) -> Result<Vec<budgets::Model>, BudgetError> {
        let versions = budgets::Entity::find()
            .filter(budgets::Column::ProjectId.eq(project_id))
            .order_by_desc(budgets::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(versions)
    }

    /// Gets the lines of the project's active budget.
    ///
    /// Returns an empty list when no budget is active; callers treat
    /// that as a valid, allocation-blocking state, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn active_lines(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<budget_lines::Model>, BudgetError> {
        let Some(active) = self.active_budget(project_id).await? else {
            return Ok(vec![]);
        };

        let lines = budget_lines::Entity::find()
            .filter(budget_lines::Column::BudgetId.eq(active.id))
            .order_by_asc(budget_lines::Column::AccountNumber)
            .all(&self.db)
            .await?;
        Ok(lines)
    }

    /// Gets the active budget's lines with derived spent and remaining
    /// amounts. Empty when no budget is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn active_lines_with_usage(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<BudgetLineWithUsage>, BudgetError> {
        let lines = self.active_lines(project_id).await?;
        if lines.is_empty() {
            return Ok(vec![]);
        }

        let line_ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();
        let spent: Vec<(Uuid, Option<Decimal>)> = invoice_allocations::Entity::find()
            .filter(invoice_allocations::Column::BudgetLineId.is_in(line_ids))
            .select_only()
            .column(invoice_allocations::Column::BudgetLineId)
            .column_as(invoice_allocations::Column::Amount.sum(), "spent")
            .group_by(invoice_allocations::Column::BudgetLineId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let result = lines
            .into_iter()
            .map(|line| {
                let spent_amount = spent
                    .iter()
                    .find(|(id, _)| *id == line.id)
                    .and_then(|(_, sum)| *sum)
                    .unwrap_or(Decimal::ZERO);
                let usage = BudgetLineUsage::derive(line.original_amount, spent_amount);
                BudgetLineWithUsage { line, usage }
            })
            .collect();
        Ok(result)
    }

    /// Gets the project's active budget, if any.
    async fn active_budget(&self, project_id: Uuid) -> Result<Option<budgets::Model>, BudgetError> {
        let active = budgets::Entity::find()
            .filter(budgets::Column::ProjectId.eq(project_id))
            .filter(budgets::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;
        Ok(active)
    }
}
