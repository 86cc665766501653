// handlers/elevated/admin/workspace/delete.rs - DELETE /api/admin/workspaces/:id

use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ActionOutcome;

pub async fn admin_workspace_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<ActionOutcome> {
    let outcome = state.workspaces.delete_workspace(&session, id).await?;
    Ok(ApiResponse::success(outcome))
}
