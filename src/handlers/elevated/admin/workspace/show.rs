// handlers/elevated/admin/workspace/show.rs - GET /api/admin/workspaces/:id

use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Session;
use crate::database::models::Workspace;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn admin_workspace_show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Workspace> {
    let workspace = state.workspaces.get_workspace(&session, id).await?;
    Ok(ApiResponse::success(workspace))
}
