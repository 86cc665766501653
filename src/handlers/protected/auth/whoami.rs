// handlers/protected/auth/whoami.rs - GET /api/auth/whoami

use axum::extract::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{landing_path, AuthorizationPolicy, Role, Session};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub superadmin: bool,
    /// Where the UI should send this user after sign-in
    pub landing: &'static str,
}

pub async fn whoami_get(Extension(session): Extension<Session>) -> ApiResult<WhoAmI> {
    Ok(ApiResponse::success(WhoAmI {
        user_id: session.user_id,
        superadmin: AuthorizationPolicy::is_superadmin(&session),
        landing: landing_path(&session),
        name: session.name,
        email: session.email,
        role: session.role,
    }))
}
