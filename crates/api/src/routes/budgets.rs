//! Budget ledger routes: upload, activation, and line listings.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use callsheet_core::invoice::ProjectRole;
use callsheet_db::repositories::budget::{BudgetError, BudgetRepository, UploadBudgetInput};

/// Creates the budget routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/{project_id}/budgets", post(upload_budget))
        .route("/projects/{project_id}/budgets", get(list_budgets))
        .route(
            "/projects/{project_id}/budgets/{budget_id}/activate",
            post(activate_budget),
        )
        .route("/projects/{project_id}/budget-lines", get(active_lines))
}

/// POST `/projects/{project_id}/budgets` - Upload a budget definition.
///
/// Multipart form: `file` (the CSV export) and optional `version_name`
/// (defaults to the uploaded file name).
async fn upload_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), ProjectRole::can_allocate).await
    {
        return response;
    }

    let mut source_content: Option<String> = None;
    let mut version_name: Option<String> = None;
    let mut file_name: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(400, "invalid_multipart", &e.to_string());
            }
        };

        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(ToString::to_string);
                match field.text().await {
                    Ok(text) => source_content = Some(text),
                    Err(e) => {
                        return error_response(400, "invalid_multipart", &e.to_string());
                    }
                }
            }
            Some("version_name") => match field.text().await {
                Ok(text) => version_name = Some(text),
                Err(e) => {
                    return error_response(400, "invalid_multipart", &e.to_string());
                }
            },
            _ => {}
        }
    }

    let Some(source_content) = source_content else {
        return error_response(400, "missing_file", "A 'file' form field is required");
    };
    let version_name = version_name
        .or(file_name)
        .unwrap_or_else(|| "untitled".to_string());

    let repo = BudgetRepository::new((*state.db).clone());
    let input = UploadBudgetInput {
        project_id,
        version_name,
        source_content,
        uploaded_by: auth.user_id(),
    };

    match repo.upload(input).await {
        Ok(budget) => {
            info!(budget_id = %budget.id, project_id = %project_id, "Budget uploaded");
            (StatusCode::CREATED, Json(budget)).into_response()
        }
        Err(BudgetError::Parse(e)) => {
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Failed to upload budget");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}

/// GET `/projects/{project_id}/budgets` - List budget versions, newest first.
async fn list_budgets(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), |_| true).await
    {
        return response;
    }

    let repo = BudgetRepository::new((*state.db).clone());
    match repo.list(project_id).await {
        Ok(budgets) => (StatusCode::OK, Json(json!({ "budgets": budgets }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list budgets");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}

/// POST `/projects/{project_id}/budgets/{budget_id}/activate` - Make one
/// version the project's active budget.
async fn activate_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, budget_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), ProjectRole::can_allocate).await
    {
        return response;
    }

    let repo = BudgetRepository::new((*state.db).clone());
    match repo.activate(project_id, budget_id).await {
        Ok(()) => {
            info!(budget_id = %budget_id, project_id = %project_id, "Budget activated");
            (StatusCode::OK, Json(json!({ "message": "Budget activated" }))).into_response()
        }
        Err(BudgetError::NotFound(_)) => {
            error_response(404, "not_found", "Budget not found in this project")
        }
        Err(e) => {
            error!(error = %e, "Failed to activate budget");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}

/// GET `/projects/{project_id}/budget-lines` - Lines of the active budget
/// with spent/remaining amounts. Empty list when no budget is active.
async fn active_lines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), |_| true).await
    {
        return response;
    }

    let repo = BudgetRepository::new((*state.db).clone());
    match repo.active_lines_with_usage(project_id).await {
        Ok(lines) => {
            let payload: Vec<_> = lines
                .into_iter()
                .map(|entry| {
                    json!({
                        "id": entry.line.id,
                        "account_number": entry.line.account_number,
                        "account_description": entry.line.account_description,
                        "category_number": entry.line.category_number,
                        "category_description": entry.line.category_description,
                        "original_amount": entry.line.original_amount,
                        "spent_amount": entry.usage.spent_amount,
                        "remaining_amount": entry.usage.remaining_amount,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "lines": payload }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list budget lines");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}
