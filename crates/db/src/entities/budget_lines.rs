//! `SeaORM` Entity for budget_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A budget line is immutable once created; spending against it is
/// derived from invoice allocations.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub account_number: String,
    pub account_description: String,
    pub category_number: String,
    pub category_description: String,
    pub original_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id"
    )]
    Budgets,
    #[sea_orm(has_many = "super::invoice_allocations::Entity")]
    InvoiceAllocations,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::invoice_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
