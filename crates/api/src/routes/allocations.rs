//! Allocation routes: reconciliation, add/remove, and vendor suggestions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use callsheet_core::allocation::AllocationError;
use callsheet_core::dedup::normalize_ico;
use callsheet_core::invoice::{InvoiceError, ProjectRole};
use callsheet_db::repositories::allocation::AllocationRepository;
use callsheet_db::repositories::invoice::InvoiceRepository;

/// Creates the allocation routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices/{invoice_id}/allocations", get(list_allocations))
        .route("/invoices/{invoice_id}/allocations", post(add_allocation))
        .route("/allocations/{allocation_id}", delete(remove_allocation))
        .route(
            "/projects/{project_id}/vendors/{ico}/suggested-lines",
            get(suggested_lines),
        )
}

/// Query parameters for vendor line suggestions.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestedLinesQuery {
    /// The invoice being allocated, if any; excluded from the vendor's
    /// history and used to decide whether the preselection applies.
    pub invoice_id: Option<Uuid>,
}

/// Request body for charging part of an invoice against a budget line.
#[derive(Debug, Deserialize)]
pub struct AddAllocationRequest {
    /// The budget line to charge.
    pub budget_line_id: Uuid,
    /// Amount to allocate; must be strictly positive.
    pub amount: Decimal,
}

/// GET `/invoices/{invoice_id}/allocations` - An invoice's allocations
/// with their budget lines, plus the current balance report.
async fn list_allocations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) =
        require_invoice_member(&state, invoice_id, auth.user_id(), |_| true).await
    {
        return response;
    }

    let repo = AllocationRepository::new((*state.db).clone());
    let allocations = match repo.list_with_lines(invoice_id).await {
        Ok(allocations) => allocations,
        Err(e) => return allocation_error(&e),
    };
    let balance = match repo.balance(invoice_id).await {
        Ok(balance) => balance,
        Err(e) => return allocation_error(&e),
    };

    (
        StatusCode::OK,
        Json(json!({ "allocations": allocations, "balance": balance })),
    )
        .into_response()
}

/// POST `/invoices/{invoice_id}/allocations` - Add an allocation.
///
/// Over-allocating a budget line is allowed; it shows up as a negative
/// remaining amount, never as an error.
async fn add_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<AddAllocationRequest>,
) -> impl IntoResponse {
    if let Err(response) =
        require_invoice_member(&state, invoice_id, auth.user_id(), ProjectRole::can_allocate).await
    {
        return response;
    }

    let repo = AllocationRepository::new((*state.db).clone());
    match repo
        .add(
            invoice_id,
            payload.budget_line_id,
            payload.amount,
            auth.user_id(),
        )
        .await
    {
        Ok(allocation) => {
            info!(
                invoice_id = %invoice_id,
                budget_line_id = %payload.budget_line_id,
                "Allocation added"
            );
            (StatusCode::CREATED, Json(allocation)).into_response()
        }
        Err(e) => allocation_error(&e),
    }
}

/// DELETE `/allocations/{allocation_id}` - Remove an allocation. Hard
/// delete; nothing is kept.
async fn remove_allocation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(allocation_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AllocationRepository::new((*state.db).clone());
    let invoice_id = match repo.invoice_id_of(allocation_id).await {
        Ok(invoice_id) => invoice_id,
        Err(e) => return allocation_error(&e),
    };
    if let Err(response) =
        require_invoice_member(&state, invoice_id, auth.user_id(), ProjectRole::can_allocate).await
    {
        return response;
    }

    match repo.remove(allocation_id).await {
        Ok(()) => {
            info!(allocation_id = %allocation_id, "Allocation removed");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => allocation_error(&e),
    }
}

/// GET `/projects/{project_id}/vendors/{ico}/suggested-lines` - Budget
/// lines the vendor's recent invoices were charged to, most recently
/// used first.
async fn suggested_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, ico)): Path<(Uuid, String)>,
    Query(query): Query<SuggestedLinesQuery>,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), |_| true).await
    {
        return response;
    }

    let ico = normalize_ico(&ico);
    let repo = AllocationRepository::new((*state.db).clone());
    match repo
        .suggest_for_vendor(project_id, &ico, query.invoice_id)
        .await
    {
        Ok(suggestions) => (StatusCode::OK, Json(suggestions)).into_response(),
        Err(e) => allocation_error(&e),
    }
}

/// Resolves the invoice's project and checks the caller's role there.
/// Inbox invoices are open to every authenticated user.
async fn require_invoice_member(
    state: &AppState,
    invoice_id: Uuid,
    user_id: Uuid,
    allowed: fn(&ProjectRole) -> bool,
) -> Result<(), Response> {
    let invoices = InvoiceRepository::new((*state.db).clone());
    let invoice = invoices
        .find_by_id(invoice_id)
        .await
        .map_err(|e| invoice_error(&e))?;
    match invoice.project_id {
        Some(project_id) => super::require_role(state, project_id, user_id, allowed)
            .await
            .map(|_| ()),
        None => Ok(()),
    }
}

fn invoice_error(err: &InvoiceError) -> Response {
    if err.status_code() >= 500 {
        error!(error = %err, "Invoice lookup failed");
    }
    error_response(err.status_code(), err.error_code(), &err.to_string())
}

fn allocation_error(err: &AllocationError) -> Response {
    if err.status_code() >= 500 {
        error!(error = %err, "Allocation operation failed");
    }
    error_response(err.status_code(), err.error_code(), &err.to_string())
}
