//! `SeaORM` Entity for invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InvoiceStatus;

/// Full invoice row, including the stored document bytes.
///
/// List queries never select `file_content`; they go through the
/// repository's summary projection so large binaries stay out of
/// list rendering.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Nullable: unattached invoices live in the global inbox.
    pub project_id: Option<Uuid>,
    /// Project-scoped sequence, assigned when the invoice joins a project.
    pub internal_id: Option<i32>,
    pub user_id: Uuid,
    pub status: InvoiceStatus,
    pub ico: Option<String>,
    pub company_name: Option<String>,
    pub bank_account: Option<String>,
    pub iban: Option<String>,
    pub variable_symbol: Option<String>,
    pub description: Option<String>,
    pub amount_with_vat: Option<Decimal>,
    pub amount_without_vat: Option<Decimal>,
    pub currency: Option<String>,
    pub confidence: Option<f32>,
    pub raw_text: Option<String>,
    pub rejection_reason: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip_serializing)]
    pub file_content: Vec<u8>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub finalized_by: Option<Uuid>,
    pub finalized_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::invoice_allocations::Entity")]
    InvoiceAllocations,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::invoice_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
