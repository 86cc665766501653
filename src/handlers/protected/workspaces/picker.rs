// handlers/protected/workspaces/picker.rs - GET /api/workspaces?q=&path=

use axum::extract::{Extension, Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::picker::{self, PickerView};

#[derive(Debug, Default, Deserialize)]
pub struct PickerQuery {
    /// Search text matched against name and slug
    pub q: Option<String>,
    /// Path the user is currently viewing, used to mark the active workspace
    pub path: Option<String>,
}

pub async fn workspace_picker(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PickerQuery>,
) -> ApiResult<PickerView> {
    let memberships = state.workspaces.my_workspaces(&session).await?;
    let view = picker::build(&memberships, query.path.as_deref(), query.q.as_deref().unwrap_or(""));
    Ok(ApiResponse::success(view))
}
