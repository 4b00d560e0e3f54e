//! Invoice routes: ingestion, listings, field edits, lifecycle
//! transitions, and the stamped document download.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use callsheet_core::allocation::AllocationError;
use callsheet_core::ingest::{IngestFile, IngestService};
use callsheet_core::invoice::{
    InvoiceError, InvoiceFields, InvoiceLifecycle, InvoiceStatus, ProjectRole,
};
use callsheet_core::stamp::AllocationBreakdownLine;
use callsheet_db::entities::invoices;
use callsheet_db::repositories::allocation::AllocationRepository;
use callsheet_db::repositories::invoice::InvoiceRepository;
use callsheet_db::repositories::project::{ProjectError, ProjectRepository};

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices/ingest", post(ingest_to_inbox))
        .route(
            "/projects/{project_id}/invoices/ingest",
            post(ingest_to_project),
        )
        .route("/invoices/inbox", get(list_inbox))
        .route("/projects/{project_id}/invoices", get(list_for_project))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}", put(update_fields))
        .route("/invoices/{invoice_id}/file", get(download_file))
        .route("/invoices/{invoice_id}/attach", post(attach_to_project))
        .route("/invoices/{invoice_id}/approve", post(approve))
        .route("/invoices/{invoice_id}/finalize", post(finalize))
        .route("/invoices/{invoice_id}/reject", post(reject))
        .route("/invoices/{invoice_id}/resubmit", post(resubmit))
        .route("/invoices/{invoice_id}/stamped", get(download_stamped))
}

/// Request body for attaching an inbox invoice to a project.
#[derive(Debug, Deserialize)]
pub struct AttachRequest {
    /// The target project.
    pub project_id: Uuid,
}

/// Request body for transitions that carry the actor's edits.
#[derive(Debug, Default, Deserialize)]
pub struct TransitionRequest {
    /// Edited field set; the invoice's current values apply when absent.
    pub fields: Option<InvoiceFields>,
}

/// Request body for rejecting an approved invoice.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the invoice is being sent back.
    pub rejection_reason: String,
    /// Edited field set; the invoice's current values apply when absent.
    pub fields: Option<InvoiceFields>,
}

/// POST `/invoices/ingest` - Upload documents into the shared inbox.
async fn ingest_to_inbox(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> impl IntoResponse {
    run_ingest(&state, auth.user_id(), None, multipart).await
}

/// POST `/projects/{project_id}/invoices/ingest` - Upload documents
/// straight into a project.
async fn ingest_to_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    multipart: Multipart,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), ProjectRole::can_submit).await
    {
        return response;
    }
    run_ingest(&state, auth.user_id(), Some(project_id), multipart).await
}

/// Runs an ingestion batch from a multipart upload.
///
/// Every file part becomes one ingestion item. Files are processed one
/// at a time; each gets its own outcome in the response.
async fn run_ingest(
    state: &AppState,
    user_id: Uuid,
    project_id: Option<Uuid>,
    mut multipart: Multipart,
) -> Response {
    let mut files: Vec<IngestFile> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(400, "invalid_multipart", &e.to_string());
            }
        };

        if let Some(file_name) = field.file_name().map(ToString::to_string) {
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let content = match field.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    return error_response(400, "invalid_multipart", &e.to_string());
                }
            };
            files.push(IngestFile {
                file_name,
                content,
                mime_type,
            });
        }
    }

    if files.is_empty() {
        return error_response(400, "missing_files", "At least one file part is required");
    }

    let gateway = Arc::new(InvoiceRepository::new((*state.db).clone()));
    let service = IngestService::new(gateway, Arc::clone(&state.extractor));
    let reports = service.process_batch(project_id, user_id, files).await;

    info!(
        count = reports.len(),
        project_id = ?project_id,
        "Ingestion batch processed"
    );
    (StatusCode::OK, Json(json!({ "results": reports }))).into_response()
}

/// GET `/invoices/inbox` - Unattached invoices, newest first.
async fn list_inbox(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.list_inbox().await {
        Ok(invoices) => (StatusCode::OK, Json(json!({ "invoices": invoices }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list inbox invoices");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}

/// GET `/projects/{project_id}/invoices` - A project's invoices, newest first.
async fn list_for_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), |_| true).await
    {
        return response;
    }

    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.list_for_project(project_id).await {
        Ok(invoices) => (StatusCode::OK, Json(json!({ "invoices": invoices }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list project invoices");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}

/// GET `/invoices/{invoice_id}` - Fetch one invoice.
async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = match repo.find_by_id(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return invoice_error(&e),
    };
    if let Err(response) = ensure_invoice_access(&state, &invoice, auth.user_id()).await {
        return response;
    }
    (StatusCode::OK, Json(invoice)).into_response()
}

/// GET `/invoices/{invoice_id}/file` - The original document bytes.
async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = match repo.find_by_id(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return invoice_error(&e),
    };
    if let Err(response) = ensure_invoice_access(&state, &invoice, auth.user_id()).await {
        return response;
    }

    match repo.file_content(invoice_id).await {
        Ok(content) => document_response(&invoice.file_name, &invoice.mime_type, content),
        Err(e) => invoice_error(&e),
    }
}

/// PUT `/invoices/{invoice_id}` - Save edited fields without a status change.
async fn update_fields(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(fields): Json<InvoiceFields>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = match repo.find_by_id(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return invoice_error(&e),
    };
    if let Some(project_id) = invoice.project_id {
        if let Err(response) =
            super::require_role(&state, project_id, auth.user_id(), ProjectRole::can_submit).await
        {
            return response;
        }
    }

    match repo.update_fields(invoice_id, fields).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => invoice_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/attach` - Move an inbox invoice into a
/// project, assigning its project-scoped internal number.
async fn attach_to_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<AttachRequest>,
) -> impl IntoResponse {
    if let Err(response) = super::require_role(
        &state,
        payload.project_id,
        auth.user_id(),
        ProjectRole::can_submit,
    )
    .await
    {
        return response;
    }

    let repo = InvoiceRepository::new((*state.db).clone());
    match repo.attach_to_project(invoice_id, payload.project_id).await {
        Ok(updated) => {
            info!(
                invoice_id = %invoice_id,
                project_id = %payload.project_id,
                internal_id = ?updated.internal_id,
                "Invoice attached to project"
            );
            (StatusCode::OK, Json(updated)).into_response()
        }
        Err(e) => invoice_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/approve` - Approve a draft.
///
/// The allocation balance guard applies unless the caller's role
/// carries the skip capability.
async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    body: Option<Json<TransitionRequest>>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = match repo.find_by_id(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return invoice_error(&e),
    };
    let Some(project_id) = invoice.project_id else {
        return error_response(
            400,
            "not_attached",
            "Invoice must be attached to a project before approval",
        );
    };

    let role = match super::require_role(
        &state,
        project_id,
        auth.user_id(),
        ProjectRole::can_allocate,
    )
    .await
    {
        Ok(role) => role,
        Err(response) => return response,
    };

    let allocations = AllocationRepository::new((*state.db).clone());
    let balance = match allocations.balance(invoice_id).await {
        Ok(balance) => balance,
        Err(e) => return allocation_error(&e),
    };

    let action = match InvoiceLifecycle::approve(
        invoice.status.into(),
        &balance,
        role.capabilities(),
        auth.user_id(),
    ) {
        Ok(action) => action,
        Err(e) => return invoice_error(&e),
    };

    let fields = transition_fields(body, &invoice);
    match repo.apply_transition(invoice_id, action, fields).await {
        Ok(updated) => {
            info!(invoice_id = %invoice_id, "Invoice approved");
            (StatusCode::OK, Json(updated)).into_response()
        }
        Err(e) => invoice_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/finalize` - Grant final approval.
/// Producer only; the resulting state is terminal.
async fn finalize(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    body: Option<Json<TransitionRequest>>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = match repo.find_by_id(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return invoice_error(&e),
    };
    let Some(project_id) = invoice.project_id else {
        return error_response(
            400,
            "not_attached",
            "Invoice must be attached to a project before final approval",
        );
    };
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), ProjectRole::can_review).await
    {
        return response;
    }

    let action = match InvoiceLifecycle::final_approve(invoice.status.into(), auth.user_id()) {
        Ok(action) => action,
        Err(e) => return invoice_error(&e),
    };

    let fields = transition_fields(body, &invoice);
    match repo.apply_transition(invoice_id, action, fields).await {
        Ok(updated) => {
            info!(invoice_id = %invoice_id, "Invoice final-approved");
            (StatusCode::OK, Json(updated)).into_response()
        }
        Err(e) => invoice_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/reject` - Send an approved invoice back
/// to the submitter with a reason. Producer only.
async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = match repo.find_by_id(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return invoice_error(&e),
    };
    let Some(project_id) = invoice.project_id else {
        return error_response(400, "not_attached", "Inbox invoices cannot be rejected");
    };
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), ProjectRole::can_review).await
    {
        return response;
    }

    let action = match InvoiceLifecycle::reject(invoice.status.into(), payload.rejection_reason) {
        Ok(action) => action,
        Err(e) => return invoice_error(&e),
    };

    let fields = payload
        .fields
        .unwrap_or_else(|| current_fields(&invoice));
    match repo.apply_transition(invoice_id, action, fields).await {
        Ok(updated) => {
            info!(invoice_id = %invoice_id, "Invoice rejected");
            (StatusCode::OK, Json(updated)).into_response()
        }
        Err(e) => invoice_error(&e),
    }
}

/// POST `/invoices/{invoice_id}/resubmit` - Return a rejected invoice to
/// draft, re-entering the normal approval path.
async fn resubmit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    body: Option<Json<TransitionRequest>>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = match repo.find_by_id(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return invoice_error(&e),
    };
    if let Some(project_id) = invoice.project_id {
        if let Err(response) =
            super::require_role(&state, project_id, auth.user_id(), ProjectRole::can_submit).await
        {
            return response;
        }
    }

    let action = match InvoiceLifecycle::resubmit(invoice.status.into()) {
        Ok(action) => action,
        Err(e) => return invoice_error(&e),
    };

    let fields = transition_fields(body, &invoice);
    match repo.apply_transition(invoice_id, action, fields).await {
        Ok(updated) => {
            info!(invoice_id = %invoice_id, "Invoice resubmitted");
            (StatusCode::OK, Json(updated)).into_response()
        }
        Err(e) => invoice_error(&e),
    }
}

/// GET `/invoices/{invoice_id}/stamped` - The original document with the
/// project, internal number, and allocation breakdown stamped on.
async fn download_stamped(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = match repo.find_by_id(invoice_id).await {
        Ok(invoice) => invoice,
        Err(e) => return invoice_error(&e),
    };
    let Some(project_id) = invoice.project_id else {
        return error_response(
            400,
            "not_attached",
            "Inbox invoices have no internal number to stamp",
        );
    };
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), |_| true).await
    {
        return response;
    }
    let Some(internal_id) = invoice.internal_id else {
        return error_response(400, "not_numbered", "Invoice has no internal number yet");
    };
    let status: InvoiceStatus = invoice.status.into();
    if status != InvoiceStatus::FinalApproved {
        return error_response(
            400,
            "not_finalized",
            "Only final-approved invoices can be stamped",
        );
    }

    let projects = ProjectRepository::new((*state.db).clone());
    let project = match projects.find_by_id(project_id).await {
        Ok(project) => project,
        Err(ProjectError::NotFound(_)) => {
            return error_response(404, "not_found", "Project not found");
        }
        Err(e) => {
            error!(error = %e, "Failed to fetch project for stamping");
            return error_response(500, "internal_error", "An error occurred");
        }
    };

    let allocations = AllocationRepository::new((*state.db).clone());
    let breakdown: Vec<AllocationBreakdownLine> =
        match allocations.list_with_lines(invoice_id).await {
            Ok(rows) => rows
                .into_iter()
                .map(|row| AllocationBreakdownLine {
                    account_number: row.line.account_number,
                    account_description: row.line.account_description,
                    amount: row.allocation.amount,
                })
                .collect(),
            Err(e) => return allocation_error(&e),
        };

    let currency = invoice.currency.clone().unwrap_or_else(|| project.currency.clone());
    let footer = callsheet_core::stamp::compose_footer(
        &project.name,
        internal_id,
        &currency,
        &breakdown,
    );

    let content = match repo.file_content(invoice_id).await {
        Ok(content) => content,
        Err(e) => return invoice_error(&e),
    };

    match state.stamper.stamp(&content, &footer).await {
        Ok(stamped) => document_response(&invoice.file_name, "application/pdf", stamped),
        Err(e) => {
            error!(error = %e, invoice_id = %invoice_id, "Stamping failed");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// Projects the persisted model back into the editable field set,
/// for transitions where the actor sent no edits.
fn current_fields(invoice: &invoices::Model) -> InvoiceFields {
    InvoiceFields {
        ico: invoice.ico.clone(),
        company_name: invoice.company_name.clone(),
        bank_account: invoice.bank_account.clone(),
        iban: invoice.iban.clone(),
        variable_symbol: invoice.variable_symbol.clone(),
        description: invoice.description.clone(),
        amount_with_vat: invoice.amount_with_vat,
        amount_without_vat: invoice.amount_without_vat,
        currency: invoice.currency.clone(),
    }
}

fn transition_fields(
    body: Option<Json<TransitionRequest>>,
    invoice: &invoices::Model,
) -> InvoiceFields {
    body.and_then(|Json(request)| request.fields)
        .unwrap_or_else(|| current_fields(invoice))
}

/// Invoices in the shared inbox are visible to every authenticated
/// user; attached invoices require project membership.
async fn ensure_invoice_access(
    state: &AppState,
    invoice: &invoices::Model,
    user_id: Uuid,
) -> Result<(), Response> {
    match invoice.project_id {
        Some(project_id) => super::require_role(state, project_id, user_id, |_| true)
            .await
            .map(|_| ()),
        None => Ok(()),
    }
}

fn document_response(file_name: &str, content_type: &str, content: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response()
}

fn invoice_error(err: &InvoiceError) -> Response {
    if err.status_code() >= 500 {
        error!(error = %err, "Invoice operation failed");
    }
    error_response(err.status_code(), err.error_code(), &err.to_string())
}

fn allocation_error(err: &AllocationError) -> Response {
    if err.status_code() >= 500 {
        error!(error = %err, "Allocation operation failed");
    }
    error_response(err.status_code(), err.error_code(), &err.to_string())
}
