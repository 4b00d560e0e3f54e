//! Project and membership routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use callsheet_core::invoice::ProjectRole;
use callsheet_db::repositories::project::{CreateProjectInput, ProjectError, ProjectRepository};

/// Creates the project routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects", post(create_project))
        .route("/projects/{project_id}", get(get_project))
        .route("/projects/{project_id}/members", post(upsert_member))
}

/// Request body for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// ISO currency code; defaults to CZK.
    pub currency: Option<String>,
    /// Production company name.
    pub company_name: Option<String>,
    /// Production company IČO.
    pub ico: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Request body for adding or updating a project member.
#[derive(Debug, Deserialize)]
pub struct UpsertMemberRequest {
    /// The member's user id.
    pub user_id: Uuid,
    /// Role name: viewer, submitter, line_producer, producer.
    pub role: String,
}

/// GET `/projects` - List the caller's projects.
async fn list_projects(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = ProjectRepository::new((*state.db).clone());
    match repo.list_for_user(auth.user_id()).await {
        Ok(projects) => (StatusCode::OK, Json(json!({ "projects": projects }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list projects");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}

/// POST `/projects` - Create a project; the creator becomes its producer.
async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    let repo = ProjectRepository::new((*state.db).clone());
    let input = CreateProjectInput {
        name: payload.name,
        currency: payload.currency.unwrap_or_else(|| "CZK".to_string()),
        company_name: payload.company_name,
        ico: payload.ico,
        description: payload.description,
        created_by: auth.user_id(),
    };

    match repo.create(input).await {
        Ok(project) => {
            info!(project_id = %project.id, "Project created");
            (StatusCode::CREATED, Json(project)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create project");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}

/// GET `/projects/{project_id}` - Fetch one project.
async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), |_| true).await
    {
        return response;
    }

    let repo = ProjectRepository::new((*state.db).clone());
    match repo.find_by_id(project_id).await {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(ProjectError::NotFound(_)) => {
            error_response(404, "not_found", "Project not found")
        }
        Err(e) => {
            error!(error = %e, "Failed to fetch project");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}

/// POST `/projects/{project_id}/members` - Add or update a member. Producer only.
async fn upsert_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpsertMemberRequest>,
) -> impl IntoResponse {
    if let Err(response) =
        super::require_role(&state, project_id, auth.user_id(), ProjectRole::can_review).await
    {
        return response;
    }

    let Some(role) = ProjectRole::parse(&payload.role) else {
        return error_response(
            400,
            "invalid_role",
            "Role must be one of: viewer, submitter, line_producer, producer",
        );
    };

    let repo = ProjectRepository::new((*state.db).clone());
    match repo.upsert_member(project_id, payload.user_id, role).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to upsert project member");
            error_response(500, "internal_error", "An error occurred")
        }
    }
}
