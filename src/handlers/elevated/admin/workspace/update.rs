// handlers/elevated/admin/workspace/update.rs - PUT /api/admin/workspaces/:id (multipart)

use axum::extract::{Extension, Multipart, Path, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Session;
use crate::handlers::form::read_workspace_form;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ActionOutcome;

/// Update metadata and, when an image part is present, replace the image.
/// A stale blob that could not be removed is reported under `warnings`.
pub async fn admin_workspace_update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<ActionOutcome> {
    let form = read_workspace_form(multipart, state.config.api.max_image_size_bytes).await?;
    let outcome = state.workspaces.update_workspace(&session, id, form).await?;
    Ok(ApiResponse::success(outcome))
}
