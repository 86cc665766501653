// handlers/protected/workspaces/settings.rs - GET /api/w/:slug/settings

use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::auth::Session;
use crate::database::models::Workspace;
use crate::middleware::{ApiResponse, ApiResult};

/// Settings view for a workspace admin. Non-admins get 403.
pub async fn workspace_settings(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(slug): Path<String>,
) -> ApiResult<Workspace> {
    let workspace = state.workspaces.workspace_settings(&session, &slug).await?;
    Ok(ApiResponse::success(workspace))
}
