use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Membership, NewWorkspace, Workspace, WorkspaceChanges, WorkspaceUser};

/// CRUD on workspace rows. Implementations must enforce slug uniqueness and
/// report a clash as `DatabaseError::Conflict`.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Workspace>, DatabaseError>;

    /// Newest first
    async fn list(&self) -> Result<Vec<Workspace>, DatabaseError>;

    async fn insert(&self, workspace: NewWorkspace) -> Result<Workspace, DatabaseError>;

    async fn update(&self, id: Uuid, changes: WorkspaceChanges) -> Result<Workspace, DatabaseError>;

    async fn set_image(&self, id: Uuid, image: Option<String>) -> Result<Workspace, DatabaseError>;

    /// Returns the removed row, or `None` when nothing matched.
    async fn delete(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Answers who administers which workspace.
#[async_trait]
pub trait MembershipAuthority: Send + Sync {
    async fn membership(&self, user_id: Uuid, workspace_id: Uuid) -> Result<Option<WorkspaceUser>, DatabaseError>;

    async fn memberships_for_user(&self, user_id: Uuid) -> Result<Vec<Membership>, DatabaseError>;
}
