// handlers/elevated/admin/workspace/list.rs - GET /api/admin/workspaces

use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::auth::Session;
use crate::database::models::Workspace;
use crate::middleware::{ApiResponse, ApiResult};

/// Every workspace, newest first
pub async fn admin_workspace_list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<Workspace>> {
    let workspaces = state.workspaces.list_workspaces(&session).await?;
    Ok(ApiResponse::success(workspaces))
}
