// handlers/protected/workspaces/delete.rs - DELETE /api/workspaces/:id

use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ActionOutcome;

pub async fn workspace_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<ActionOutcome> {
    let outcome = state.workspaces.delete_workspace_as_admin(&session, id).await?;
    Ok(ApiResponse::success(outcome))
}
