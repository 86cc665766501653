// handlers/elevated/admin/workspace/create.rs - POST /api/admin/workspaces (multipart)

use axum::extract::{Extension, Multipart, State};

use crate::app::AppState;
use crate::auth::Session;
use crate::handlers::form::read_workspace_form;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ActionOutcome;

/// Create a workspace, optionally with a branding image.
///
/// Form fields: `name`, `slug`, `description` (optional), `image` (optional
/// file, `image/*`). Answers 201 with the created workspace.
pub async fn admin_workspace_create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> ApiResult<ActionOutcome> {
    let form = read_workspace_form(multipart, state.config.api.max_image_size_bytes).await?;
    let outcome = state.workspaces.create_workspace(&session, form).await?;
    Ok(ApiResponse::created(outcome))
}
