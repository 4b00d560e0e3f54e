//! Initial database migration.
//!
//! Creates the enums, core tables, and indexes for projects, budgets,
//! invoices, and allocations.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PROJECTS_SQL).await?;
        db.execute_unprepared(PROJECT_MEMBERS_SQL).await?;

        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(BUDGET_LINES_SQL).await?;

        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_ALLOCATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Invoice lifecycle status
CREATE TYPE invoice_status AS ENUM (
    'draft',
    'approved',
    'final_approved',
    'rejected'
);

-- Per-project team role
CREATE TYPE project_role AS ENUM (
    'viewer',
    'submitter',
    'line_producer',
    'producer'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PROJECTS_SQL: &str = r"
CREATE TABLE projects (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'CZK',
    company_name VARCHAR(255),
    ico VARCHAR(32),
    description TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PROJECT_MEMBERS_SQL: &str = r"
CREATE TABLE project_members (
    id UUID PRIMARY KEY,
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role project_role NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (project_id, user_id)
);

CREATE INDEX idx_project_members_user ON project_members(user_id);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY,
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    version_name VARCHAR(255) NOT NULL,
    source_content TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT FALSE,
    uploaded_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_budgets_project ON budgets(project_id);

-- At most one active budget per project
CREATE UNIQUE INDEX idx_budgets_one_active
    ON budgets(project_id) WHERE is_active;
";

const BUDGET_LINES_SQL: &str = r"
CREATE TABLE budget_lines (
    id UUID PRIMARY KEY,
    budget_id UUID NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
    account_number VARCHAR(64) NOT NULL,
    account_description VARCHAR(255) NOT NULL DEFAULT '',
    category_number VARCHAR(64) NOT NULL,
    category_description VARCHAR(255) NOT NULL DEFAULT '',
    original_amount DECIMAL(19,4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_budget_lines_budget ON budget_lines(budget_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
    internal_id INTEGER,
    user_id UUID NOT NULL REFERENCES users(id),
    status invoice_status NOT NULL DEFAULT 'draft',
    ico VARCHAR(32),
    company_name VARCHAR(255),
    bank_account VARCHAR(64),
    iban VARCHAR(64),
    variable_symbol VARCHAR(32),
    description TEXT,
    amount_with_vat DECIMAL(19,4),
    amount_without_vat DECIMAL(19,4),
    currency VARCHAR(3),
    confidence REAL,
    raw_text TEXT,
    rejection_reason TEXT,
    file_name VARCHAR(255) NOT NULL,
    mime_type VARCHAR(127) NOT NULL DEFAULT 'application/octet-stream',
    file_content BYTEA NOT NULL,
    approved_by UUID REFERENCES users(id),
    approved_at TIMESTAMPTZ,
    finalized_by UUID REFERENCES users(id),
    finalized_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoices_project ON invoices(project_id);
CREATE INDEX idx_invoices_user ON invoices(user_id);
CREATE INDEX idx_invoices_dedup ON invoices(project_id, ico);

-- Internal id is unique within a project and immutable after assignment
CREATE UNIQUE INDEX idx_invoices_project_internal_id
    ON invoices(project_id, internal_id) WHERE project_id IS NOT NULL;
";

const INVOICE_ALLOCATIONS_SQL: &str = r"
CREATE TABLE invoice_allocations (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    budget_line_id UUID NOT NULL REFERENCES budget_lines(id) ON DELETE CASCADE,
    amount DECIMAL(19,4) NOT NULL CHECK (amount > 0),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoice_allocations_invoice ON invoice_allocations(invoice_id);
CREATE INDEX idx_invoice_allocations_line ON invoice_allocations(budget_line_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS invoice_allocations CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS budget_lines CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS project_members CASCADE;
DROP TABLE IF EXISTS projects CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS project_role;
";
