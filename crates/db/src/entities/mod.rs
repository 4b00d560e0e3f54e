//! `SeaORM` entity definitions.

pub mod budget_lines;
pub mod budgets;
pub mod invoice_allocations;
pub mod invoices;
pub mod project_members;
pub mod projects;
pub mod sea_orm_active_enums;
pub mod users;
