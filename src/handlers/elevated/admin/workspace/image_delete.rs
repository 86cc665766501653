// handlers/elevated/admin/workspace/image_delete.rs - DELETE /api/admin/workspaces/:id/image

use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ActionOutcome;

/// Remove the workspace image. If storage refuses the delete the image field
/// is left as it was and the call fails with 502.
pub async fn admin_workspace_image_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<ActionOutcome> {
    let outcome = state.workspaces.delete_workspace_image(&session, id).await?;
    Ok(ApiResponse::success(outcome))
}
