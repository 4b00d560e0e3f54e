//! Project repository for project and membership operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use callsheet_core::invoice::ProjectRole;

use crate::entities::{project_members, projects, sea_orm_active_enums};

/// Error types for project operations.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Project not found.
    #[error("Project not found: {0}")]
    NotFound(Uuid),

    /// The user is not a member of the project.
    #[error("User is not a member of this project")]
    NotAMember,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    /// Project name.
    pub name: String,
    /// ISO currency code.
    pub currency: String,
    /// Production company name.
    pub company_name: Option<String>,
    /// Production company IČO.
    pub ico: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Creating user; also seeded as the project's producer.
    pub created_by: Uuid,
}

/// Project repository for CRUD and membership lookups.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a project and seeds the creator as its producer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreateProjectInput) -> Result<projects::Model, ProjectError> {
        let now = Utc::now().into();
        let project_id = Uuid::new_v4();

        let project = projects::ActiveModel {
            id: Set(project_id),
            name: Set(input.name),
            currency: Set(input.currency),
            company_name: Set(input.company_name),
            ico: Set(input.ico),
            description: Set(input.description),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = project.insert(&self.db).await?;

        let membership = project_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            user_id: Set(input.created_by),
            role: Set(sea_orm_active_enums::ProjectRole::Producer),
            created_at: Set(now),
        };
        membership.insert(&self.db).await?;

        Ok(created)
    }

    /// Gets a project by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found or the query fails.
    pub async fn find_by_id(&self, project_id: Uuid) -> Result<projects::Model, ProjectError> {
        projects::Entity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or(ProjectError::NotFound(project_id))
    }

    /// Lists the projects a user is a member of, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<projects::Model>, ProjectError> {
        let memberships = project_members::Entity::find()
            .filter(project_members::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        let project_ids: Vec<Uuid> = memberships.iter().map(|m| m.project_id).collect();
        if project_ids.is_empty() {
            return Ok(vec![]);
        }

        let projects = projects::Entity::find()
            .filter(projects::Column::Id.is_in(project_ids))
            .order_by_desc(projects::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(projects)
    }

    /// Looks up a user's role within a project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::NotAMember` when the user has no role in
    /// the project.
    pub async fn member_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<ProjectRole, ProjectError> {
        let membership = project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(project_id))
            .filter(project_members::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(ProjectError::NotAMember)?;
        Ok(membership.role.into())
    }

    /// Adds or replaces a member's role in a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn upsert_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<project_members::Model, ProjectError> {
        let existing = project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(project_id))
            .filter(project_members::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        if let Some(member) = existing {
            let mut active: project_members::ActiveModel = member.into();
            active.role = Set(role.into());
            return Ok(active.update(&self.db).await?);
        }

        let membership = project_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            user_id: Set(user_id),
            role: Set(role.into()),
            created_at: Set(Utc::now().into()),
        };
        Ok(membership.insert(&self.db).await?)
    }
}
