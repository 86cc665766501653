use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Membership, NewWorkspace, Workspace, WorkspaceChanges, WorkspaceRole, WorkspaceUser};
use crate::database::repository::{MembershipAuthority, WorkspaceRepository};

#[derive(Default)]
struct Tables {
    workspaces: Vec<Workspace>,
    members: Vec<WorkspaceUser>,
}

/// In-process store used by the development profile and the test suite.
/// Counts writes so callers can assert an operation had no side effects.
#[derive(Clone, Default)]
pub struct MemoryWorkspaceRepository {
    tables: Arc<RwLock<Tables>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryWorkspaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_member(&self, workspace_id: Uuid, user_id: Uuid, role: WorkspaceRole) {
        let mut tables = self.tables.write().await;
        tables
            .members
            .retain(|m| !(m.workspace_id == workspace_id && m.user_id == user_id));
        tables.members.push(WorkspaceUser {
            workspace_id,
            user_id,
            role,
        });
    }

    /// Number of successful row mutations so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent mutation fail with a query error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DatabaseError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("simulated write failure".to_string()));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn slug_taken(tables: &Tables, slug: &str, except: Option<Uuid>) -> bool {
    tables
        .workspaces
        .iter()
        .any(|w| w.slug == slug && Some(w.id) != except)
}

#[async_trait]
impl WorkspaceRepository for MemoryWorkspaceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.workspaces.iter().find(|w| w.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Workspace>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.workspaces.iter().find(|w| w.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Workspace>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows = tables.workspaces.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert(&self, workspace: NewWorkspace) -> Result<Workspace, DatabaseError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if slug_taken(&tables, &workspace.slug, None) {
            return Err(DatabaseError::Conflict("workspaces_slug_key".to_string()));
        }

        let now = Utc::now();
        let row = Workspace {
            id: Uuid::new_v4(),
            slug: workspace.slug,
            name: workspace.name,
            description: workspace.description,
            image: None,
            created_at: now,
            updated_at: now,
        };
        tables.workspaces.push(row.clone());
        self.record_write();
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: WorkspaceChanges) -> Result<Workspace, DatabaseError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if slug_taken(&tables, &changes.slug, Some(id)) {
            return Err(DatabaseError::Conflict("workspaces_slug_key".to_string()));
        }

        let row = tables
            .workspaces
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()))?;
        row.name = changes.name;
        row.slug = changes.slug;
        row.description = changes.description;
        row.updated_at = Utc::now();
        let updated = row.clone();
        self.record_write();
        Ok(updated)
    }

    async fn set_image(&self, id: Uuid, image: Option<String>) -> Result<Workspace, DatabaseError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let row = tables
            .workspaces
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()))?;
        row.image = image;
        row.updated_at = Utc::now();
        let updated = row.clone();
        self.record_write();
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let Some(index) = tables.workspaces.iter().position(|w| w.id == id) else {
            return Ok(None);
        };
        let removed = tables.workspaces.remove(index);
        tables.members.retain(|m| m.workspace_id != id);
        self.record_write();
        Ok(Some(removed))
    }
}

#[async_trait]
impl MembershipAuthority for MemoryWorkspaceRepository {
    async fn membership(&self, user_id: Uuid, workspace_id: Uuid) -> Result<Option<WorkspaceUser>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .find(|m| m.user_id == user_id && m.workspace_id == workspace_id)
            .cloned())
    }

    async fn memberships_for_user(&self, user_id: Uuid) -> Result<Vec<Membership>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut out: Vec<Membership> = tables
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                tables
                    .workspaces
                    .iter()
                    .find(|w| w.id == m.workspace_id)
                    .map(|w| Membership {
                        workspace: w.clone(),
                        role: m.role,
                    })
            })
            .collect();
        out.sort_by(|a, b| a.workspace.name.cmp(&b.workspace.name));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_workspace(slug: &str) -> NewWorkspace {
        NewWorkspace {
            name: format!("Workspace {}", slug),
            slug: slug.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn enforces_unique_slugs() {
        let repo = MemoryWorkspaceRepository::new();
        repo.insert(new_workspace("acme")).await.unwrap();

        let err = repo.insert(new_workspace("acme")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert_eq!(repo.write_count(), 1);
    }

    #[tokio::test]
    async fn update_may_keep_its_own_slug() {
        let repo = MemoryWorkspaceRepository::new();
        let ws = repo.insert(new_workspace("acme")).await.unwrap();
        let other = repo.insert(new_workspace("globex")).await.unwrap();

        let changes = WorkspaceChanges {
            name: "Acme Corp".to_string(),
            slug: "acme".to_string(),
            description: Some("Rockets".to_string()),
        };
        let updated = repo.update(ws.id, changes).await.unwrap();
        assert_eq!(updated.name, "Acme Corp");

        let clash = WorkspaceChanges {
            name: "Globex".to_string(),
            slug: "acme".to_string(),
            description: None,
        };
        assert!(matches!(repo.update(other.id, clash).await, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn delete_drops_memberships() {
        let repo = MemoryWorkspaceRepository::new();
        let ws = repo.insert(new_workspace("acme")).await.unwrap();
        let user = Uuid::new_v4();
        repo.add_member(ws.id, user, WorkspaceRole::Admin).await;

        assert!(repo.membership(user, ws.id).await.unwrap().is_some());
        assert_eq!(repo.delete(ws.id).await.unwrap().map(|w| w.id), Some(ws.id));
        assert!(repo.membership(user, ws.id).await.unwrap().is_none());
        assert!(repo.delete(ws.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memberships_are_sorted_by_name() {
        let repo = MemoryWorkspaceRepository::new();
        let user = Uuid::new_v4();
        let b = repo.insert(new_workspace("beta")).await.unwrap();
        let a = repo.insert(new_workspace("alpha")).await.unwrap();
        repo.add_member(b.id, user, WorkspaceRole::Member).await;
        repo.add_member(a.id, user, WorkspaceRole::Admin).await;

        let slugs: Vec<_> = repo
            .memberships_for_user(user)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.workspace.slug)
            .collect();
        assert_eq!(slugs, vec!["alpha", "beta"]);
    }
}
