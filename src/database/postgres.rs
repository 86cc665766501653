use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Membership, NewWorkspace, Workspace, WorkspaceChanges, WorkspaceRole, WorkspaceUser};
use crate::database::repository::{MembershipAuthority, WorkspaceRepository};

const WORKSPACE_COLUMNS: &str = "id, slug, name, description, image, created_at, updated_at";

/// Workspace rows and memberships backed by Postgres
#[derive(Clone)]
pub struct PgWorkspaceRepository {
    pool: PgPool,
}

impl PgWorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add_member(&self, workspace_id: Uuid, user_id: Uuid, role: WorkspaceRole) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO workspace_users (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (workspace_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn parse_role(row: &PgRow) -> Result<WorkspaceRole, DatabaseError> {
    let raw: String = row.try_get("role")?;
    raw.parse().map_err(DatabaseError::QueryError)
}

#[async_trait]
impl WorkspaceRepository for PgWorkspaceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        let query = format!("SELECT {} FROM workspaces WHERE id = $1", WORKSPACE_COLUMNS);
        let row = sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Workspace>, DatabaseError> {
        let query = format!("SELECT {} FROM workspaces WHERE slug = $1", WORKSPACE_COLUMNS);
        let row = sqlx::query_as::<_, Workspace>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<Workspace>, DatabaseError> {
        let query = format!("SELECT {} FROM workspaces ORDER BY created_at DESC", WORKSPACE_COLUMNS);
        let rows = sqlx::query_as::<_, Workspace>(&query).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn insert(&self, workspace: NewWorkspace) -> Result<Workspace, DatabaseError> {
        let query = format!(
            "INSERT INTO workspaces (id, slug, name, description) VALUES ($1, $2, $3, $4) RETURNING {}",
            WORKSPACE_COLUMNS
        );
        let row = sqlx::query_as::<_, Workspace>(&query)
            .bind(Uuid::new_v4())
            .bind(&workspace.slug)
            .bind(&workspace.name)
            .bind(&workspace.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: WorkspaceChanges) -> Result<Workspace, DatabaseError> {
        let query = format!(
            "UPDATE workspaces SET name = $2, slug = $3, description = $4, updated_at = $5 WHERE id = $1 RETURNING {}",
            WORKSPACE_COLUMNS
        );
        let row = sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.slug)
            .bind(&changes.description)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_image(&self, id: Uuid, image: Option<String>) -> Result<Workspace, DatabaseError> {
        let query = format!(
            "UPDATE workspaces SET image = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            WORKSPACE_COLUMNS
        );
        let row = sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .bind(image)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        let query = format!("DELETE FROM workspaces WHERE id = $1 RETURNING {}", WORKSPACE_COLUMNS);
        let row = sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[async_trait]
impl MembershipAuthority for PgWorkspaceRepository {
    async fn membership(&self, user_id: Uuid, workspace_id: Uuid) -> Result<Option<WorkspaceUser>, DatabaseError> {
        let row = sqlx::query("SELECT workspace_id, user_id, role FROM workspace_users WHERE user_id = $1 AND workspace_id = $2")
            .bind(user_id)
            .bind(workspace_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(WorkspaceUser {
                workspace_id: row.try_get("workspace_id")?,
                user_id: row.try_get("user_id")?,
                role: parse_role(&row)?,
            })),
            None => Ok(None),
        }
    }

    async fn memberships_for_user(&self, user_id: Uuid) -> Result<Vec<Membership>, DatabaseError> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.slug, w.name, w.description, w.image, w.created_at, w.updated_at, wu.role
            FROM workspace_users wu
            JOIN workspaces w ON w.id = wu.workspace_id
            WHERE wu.user_id = $1
            ORDER BY w.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Membership, DatabaseError> {
                Ok(Membership {
                    workspace: Workspace {
                        id: row.try_get("id")?,
                        slug: row.try_get("slug")?,
                        name: row.try_get("name")?,
                        description: row.try_get("description")?,
                        image: row.try_get("image")?,
                        created_at: row.try_get("created_at")?,
                        updated_at: row.try_get("updated_at")?,
                    },
                    role: parse_role(row)?,
                })
            })
            .collect()
    }
}
