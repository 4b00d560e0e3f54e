//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::auth::auth_middleware};
use callsheet_core::invoice::ProjectRole;
use callsheet_db::repositories::project::{ProjectError, ProjectRepository};

pub mod allocations;
pub mod budgets;
pub mod health;
pub mod invoices;
pub mod projects;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(projects::routes())
        .merge(budgets::routes())
        .merge(invoices::routes())
        .merge(allocations::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Builds a JSON error response in the shared envelope.
pub(crate) fn error_response(status: u16, error: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Resolves the caller's role in a project and checks it against a
/// predicate; produces the forbidden/NotAMember responses in one place.
pub(crate) async fn require_role(
    state: &AppState,
    project_id: Uuid,
    user_id: Uuid,
    allowed: fn(&ProjectRole) -> bool,
) -> Result<ProjectRole, Response> {
    let repo = ProjectRepository::new((*state.db).clone());
    match repo.member_role(project_id, user_id).await {
        Ok(role) if allowed(&role) => Ok(role),
        Ok(_) => Err(error_response(
            403,
            "forbidden",
            "Your project role does not allow this action",
        )),
        Err(ProjectError::NotAMember) => Err(error_response(
            403,
            "forbidden",
            "You are not a member of this project",
        )),
        Err(e) => {
            error!(error = %e, "Failed to resolve project role");
            Err(error_response(
                500,
                "internal_error",
                "An error occurred",
            ))
        }
    }
}
