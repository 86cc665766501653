// handlers/protected/workspaces/update.rs - PUT /api/workspaces/:id (multipart)

use axum::extract::{Extension, Multipart, Path, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Session;
use crate::handlers::form::read_workspace_form;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ActionOutcome;

pub async fn workspace_update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<ActionOutcome> {
    let form = read_workspace_form(multipart, state.config.api.max_image_size_bytes).await?;
    let outcome = state.workspaces.update_workspace_as_admin(&session, id, form).await?;
    Ok(ApiResponse::success(outcome))
}
