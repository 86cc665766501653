// handlers/protected/workspaces/image_delete.rs - DELETE /api/workspaces/:id/image

use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ActionOutcome;

pub async fn workspace_image_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<ActionOutcome> {
    let outcome = state.workspaces.delete_workspace_image_as_admin(&session, id).await?;
    Ok(ApiResponse::success(outcome))
}
