use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{validate_jwt, AuthorizationPolicy, Session};
use crate::error::ApiError;

/// Validates the bearer token and injects the caller's [`Session`] into the request.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token, &state.config.security.jwt_secret).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized(e.to_string())
    })?;

    request.extensions_mut().insert(Session::from(claims));
    Ok(next.run(request).await)
}

/// Gate for the global admin surface. Must run after [`jwt_auth_middleware`].
/// The service re-checks the role on every call; this only keeps the routes
/// from answering at all for ordinary users.
pub async fn superadmin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let session = request
        .extensions()
        .get::<Session>()
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    AuthorizationPolicy::require_superadmin(session)?;
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
