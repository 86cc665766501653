use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthorizationError, AuthorizationPolicy, Session};
use crate::database::models::{Membership, NewWorkspace, Workspace, WorkspaceChanges, WorkspaceRole};
use crate::database::{DatabaseError, MembershipAuthority, WorkspaceRepository};
use crate::invalidation::{paths, Revalidator};
use crate::services::image_reconciler::{ImageError, ImageFile, ImageReconciler, StorageCleanupWarning};

const MAX_NAME_LEN: usize = 100;
const MAX_SLUG_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("A workspace with this slug already exists")]
    SlugTaken,

    #[error("Workspace not found")]
    NotFound,

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for WorkspaceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            // slug is the only unique column a caller can collide on
            DatabaseError::Conflict(_) => WorkspaceError::SlugTaken,
            DatabaseError::NotFound(_) => WorkspaceError::NotFound,
            other => WorkspaceError::Database(other),
        }
    }
}

/// Submitted create/update form
#[derive(Debug, Clone, Default)]
pub struct WorkspaceForm {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<ImageFile>,
}

impl WorkspaceForm {
    /// Trim fields; blank description and empty files count as absent.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.slug = self.slug.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.image = self.image.filter(|f| !f.is_empty());
        self
    }

    pub fn validate(&self, max_image_bytes: usize) -> Result<(), WorkspaceError> {
        let mut field_errors = HashMap::new();

        if self.name.is_empty() {
            field_errors.insert("name".to_string(), "Name is required".to_string());
        } else if self.name.chars().count() > MAX_NAME_LEN {
            field_errors.insert("name".to_string(), format!("Name must be at most {} characters", MAX_NAME_LEN));
        }

        if let Err(msg) = validate_slug(&self.slug) {
            field_errors.insert("slug".to_string(), msg);
        }

        if let Some(image) = &self.image {
            if !image.content_type.starts_with("image/") {
                field_errors.insert("image".to_string(), "File must be an image".to_string());
            } else if image.len() > max_image_bytes {
                field_errors.insert(
                    "image".to_string(),
                    format!("Image must be smaller than {}", size_label(max_image_bytes)),
                );
            }
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(WorkspaceError::Validation {
                message: "Invalid workspace data".to_string(),
                field_errors,
            })
        }
    }
}

/// `2MB`, `64KB` or `900 bytes`
pub fn size_label(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB {
        format!("{}KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug is required".to_string());
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(format!("Slug must be at most {} characters", MAX_SLUG_LEN));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err("Slug may only contain lowercase letters, numbers and hyphens".to_string());
    }
    Ok(())
}

/// Result of a successful mutation
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<Workspace>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ActionOutcome {
    fn new(message: &str, workspace: Option<Workspace>, warnings: Vec<StorageCleanupWarning>) -> Self {
        Self {
            message: message.to_string(),
            workspace,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

enum Scope {
    Global,
    Workspace { id: Uuid, action: &'static str },
}

#[derive(Clone)]
pub struct WorkspaceService {
    workspaces: Arc<dyn WorkspaceRepository>,
    members: Arc<dyn MembershipAuthority>,
    images: ImageReconciler,
    revalidator: Arc<dyn Revalidator>,
    max_image_bytes: usize,
}

impl WorkspaceService {
    pub fn new(
        workspaces: Arc<dyn WorkspaceRepository>,
        members: Arc<dyn MembershipAuthority>,
        images: ImageReconciler,
        revalidator: Arc<dyn Revalidator>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            workspaces,
            members,
            images,
            revalidator,
            max_image_bytes,
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.workspaces.health_check().await
    }

    /// Runs before anything else in every entry point; a refusal has no side effects.
    async fn authorize(&self, session: &Session, scope: Scope) -> Result<(), WorkspaceError> {
        let result = match scope {
            Scope::Global => AuthorizationPolicy::require_superadmin(session),
            Scope::Workspace { id, action } => {
                let membership = self.members.membership(session.user_id, id).await?;
                AuthorizationPolicy::require_workspace_admin(session, id, membership.as_ref(), action)
            }
        };

        if let Err(e) = &result {
            warn!(user_id = %session.user_id, role = session.role.as_str(), "Authorization refused: {}", e);
        }
        Ok(result?)
    }

    // ---- global tier (superadmin) ----

    pub async fn list_workspaces(&self, session: &Session) -> Result<Vec<Workspace>, WorkspaceError> {
        self.authorize(session, Scope::Global).await?;
        Ok(self.workspaces.list().await?)
    }

    pub async fn get_workspace(&self, session: &Session, id: Uuid) -> Result<Workspace, WorkspaceError> {
        self.authorize(session, Scope::Global).await?;
        self.workspaces.find_by_id(id).await?.ok_or(WorkspaceError::NotFound)
    }

    pub async fn create_workspace(&self, session: &Session, form: WorkspaceForm) -> Result<ActionOutcome, WorkspaceError> {
        self.authorize(session, Scope::Global).await?;

        let form = form.normalized();
        form.validate(self.max_image_bytes)?;

        if self.workspaces.find_by_slug(&form.slug).await?.is_some() {
            return Err(WorkspaceError::SlugTaken);
        }

        let workspace = self
            .workspaces
            .insert(NewWorkspace {
                name: form.name,
                slug: form.slug,
                description: form.description,
            })
            .await?;
        info!(workspace_id = %workspace.id, slug = %workspace.slug, "Workspace created");

        // The row exists from here on; an image failure is reported but the workspace stays.
        let attached = self.attach_image(workspace, form.image).await;
        self.revalidator.revalidate(paths::ADMIN_WORKSPACES);
        Ok(ActionOutcome::new("Workspace created successfully", Some(attached?), Vec::new()))
    }

    async fn attach_image(&self, workspace: Workspace, image: Option<ImageFile>) -> Result<Workspace, WorkspaceError> {
        let Some(url) = self.images.create(workspace.id, image).await? else {
            return Ok(workspace);
        };
        match self.workspaces.set_image(workspace.id, Some(url.clone())).await {
            Ok(row) => Ok(row),
            Err(e) => {
                self.images.release(workspace.id, &url).await;
                Err(e.into())
            }
        }
    }

    pub async fn update_workspace(
        &self,
        session: &Session,
        id: Uuid,
        form: WorkspaceForm,
    ) -> Result<ActionOutcome, WorkspaceError> {
        self.authorize(session, Scope::Global).await?;
        let (workspace, warnings) = self.apply_update(id, form).await?;

        self.revalidator.revalidate(paths::ADMIN_WORKSPACES);
        self.revalidator.revalidate(&paths::admin_workspace(id));
        Ok(ActionOutcome::new("Workspace updated successfully", Some(workspace), warnings))
    }

    pub async fn delete_workspace(&self, session: &Session, id: Uuid) -> Result<ActionOutcome, WorkspaceError> {
        self.authorize(session, Scope::Global).await?;
        let warnings = self.remove(id).await?;

        self.revalidator.revalidate(paths::ADMIN_WORKSPACES);
        Ok(ActionOutcome::new("Workspace deleted successfully", None, warnings))
    }

    pub async fn delete_workspace_image(&self, session: &Session, id: Uuid) -> Result<ActionOutcome, WorkspaceError> {
        self.authorize(session, Scope::Global).await?;
        let (workspace, removed) = self.remove_image(id).await?;

        self.revalidator.revalidate(paths::ADMIN_WORKSPACES);
        self.revalidator.revalidate(&paths::admin_workspace(id));
        Ok(ActionOutcome::new(image_message(removed), Some(workspace), Vec::new()))
    }

    // ---- workspace tier (workspace admin membership) ----

    pub async fn workspace_settings(&self, session: &Session, slug: &str) -> Result<Workspace, WorkspaceError> {
        let workspace = self.workspaces.find_by_slug(slug).await?.ok_or(WorkspaceError::NotFound)?;
        self.authorize(
            session,
            Scope::Workspace {
                id: workspace.id,
                action: "manage",
            },
        )
        .await?;
        Ok(workspace)
    }

    pub async fn update_workspace_as_admin(
        &self,
        session: &Session,
        id: Uuid,
        form: WorkspaceForm,
    ) -> Result<ActionOutcome, WorkspaceError> {
        self.authorize(session, Scope::Workspace { id, action: "update" }).await?;
        let (workspace, warnings) = self.apply_update(id, form).await?;

        self.revalidator.revalidate(&paths::workspace_settings(&workspace.slug));
        self.revalidator.revalidate(&paths::workspace_home(&workspace.slug));
        Ok(ActionOutcome::new("Workspace updated successfully", Some(workspace), warnings))
    }

    pub async fn delete_workspace_as_admin(&self, session: &Session, id: Uuid) -> Result<ActionOutcome, WorkspaceError> {
        self.authorize(session, Scope::Workspace { id, action: "delete" }).await?;
        let warnings = self.remove(id).await?;

        self.revalidator.revalidate(paths::MEMBER_WORKSPACES);
        Ok(ActionOutcome::new("Workspace deleted successfully", None, warnings))
    }

    pub async fn delete_workspace_image_as_admin(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<ActionOutcome, WorkspaceError> {
        self.authorize(session, Scope::Workspace { id, action: "modify" }).await?;
        let (workspace, removed) = self.remove_image(id).await?;

        self.revalidator.revalidate(&paths::workspace_settings(&workspace.slug));
        self.revalidator.revalidate(&paths::workspace_home(&workspace.slug));
        Ok(ActionOutcome::new(image_message(removed), Some(workspace), Vec::new()))
    }

    // ---- member views ----

    /// Workspaces visible to the session. Superadmins see every workspace;
    /// those they are not a member of are reported with the admin role.
    pub async fn my_workspaces(&self, session: &Session) -> Result<Vec<Membership>, WorkspaceError> {
        let memberships = self.members.memberships_for_user(session.user_id).await?;
        if !AuthorizationPolicy::is_superadmin(session) {
            return Ok(memberships);
        }

        let mut all: Vec<Membership> = self
            .workspaces
            .list()
            .await?
            .into_iter()
            .map(|workspace| {
                let role = memberships
                    .iter()
                    .find(|m| m.workspace.id == workspace.id)
                    .map(|m| m.role)
                    .unwrap_or(WorkspaceRole::Admin);
                Membership { workspace, role }
            })
            .collect();
        all.sort_by(|a, b| a.workspace.name.cmp(&b.workspace.name));
        Ok(all)
    }

    // ---- shared steps ----

    /// Upload first, then write the row, then drop the superseded blob.
    async fn apply_update(
        &self,
        id: Uuid,
        form: WorkspaceForm,
    ) -> Result<(Workspace, Vec<StorageCleanupWarning>), WorkspaceError> {
        let form = form.normalized();
        form.validate(self.max_image_bytes)?;

        if let Some(existing) = self.workspaces.find_by_slug(&form.slug).await? {
            if existing.id != id {
                return Err(WorkspaceError::SlugTaken);
            }
        }

        let current = self.workspaces.find_by_id(id).await?.ok_or(WorkspaceError::NotFound)?;

        let staged = match form.image {
            Some(file) => Some(self.images.stage(id, file).await?),
            None => None,
        };

        let changes = WorkspaceChanges {
            name: form.name,
            slug: form.slug,
            description: form.description,
        };

        let mut workspace = match self.workspaces.update(id, changes).await {
            Ok(row) => row,
            Err(e) => {
                if let Some(staged) = staged {
                    self.images.discard(staged).await;
                }
                return Err(e.into());
            }
        };

        let mut warnings = Vec::new();
        if let Some(staged) = staged {
            workspace = match self.workspaces.set_image(id, Some(staged.url.clone())).await {
                Ok(row) => row,
                Err(e) => {
                    self.images.discard(staged).await;
                    return Err(e.into());
                }
            };
            warnings.extend(self.images.commit(&staged, current.image.as_deref()).await);
        }

        info!(workspace_id = %id, slug = %workspace.slug, "Workspace updated");
        Ok((workspace, warnings))
    }

    /// Row first, blob second: a failed blob delete orphans it but never dangles.
    async fn remove(&self, id: Uuid) -> Result<Vec<StorageCleanupWarning>, WorkspaceError> {
        let removed = self.workspaces.delete(id).await?.ok_or(WorkspaceError::NotFound)?;
        info!(workspace_id = %id, slug = %removed.slug, "Workspace deleted");

        let mut warnings = Vec::new();
        if let Some(url) = removed.image.as_deref() {
            warnings.extend(self.images.release(id, url).await);
        }
        Ok(warnings)
    }

    /// Blob first; the column is cleared only once the blob is gone.
    async fn remove_image(&self, id: Uuid) -> Result<(Workspace, bool), WorkspaceError> {
        let workspace = self.workspaces.find_by_id(id).await?.ok_or(WorkspaceError::NotFound)?;

        if !self.images.delete(id, workspace.image.as_deref()).await? {
            return Ok((workspace, false));
        }

        let workspace = self.workspaces.set_image(id, None).await?;
        Ok((workspace, true))
    }
}

fn image_message(removed: bool) -> &'static str {
    if removed {
        "Image deleted successfully"
    } else {
        "Workspace has no image"
    }
}
