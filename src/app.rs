use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::{AppConfig, Backend};
use crate::database::{DatabaseManager, MembershipAuthority, MemoryWorkspaceRepository, PgWorkspaceRepository, WorkspaceRepository};
use crate::handlers::{elevated, protected, public};
use crate::invalidation::{BroadcastRevalidator, Revalidator};
use crate::middleware::{jwt_auth_middleware, superadmin_middleware};
use crate::services::{ImageReconciler, WorkspaceService};
use crate::storage::{HttpObjectStore, LocalObjectStore, MemoryObjectStore, ObjectStore};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub workspaces: WorkspaceService,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, workspaces: WorkspaceService) -> Self {
        Self { config, workspaces }
    }

    /// Wire up the configured database and storage backends.
    pub async fn from_config(config: Arc<AppConfig>, revalidator: Arc<dyn Revalidator>) -> anyhow::Result<Self> {
        let (workspaces, members) = repositories(&config).await?;
        let store = object_store(&config)?;

        let service = WorkspaceService::new(
            workspaces,
            members,
            ImageReconciler::new(store),
            revalidator,
            config.api.max_image_size_bytes,
        );
        Ok(Self::new(config, service))
    }
}

async fn repositories(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn WorkspaceRepository>, Arc<dyn MembershipAuthority>)> {
    match config.database.backend {
        Backend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to the workspace database")?;
            let repo = PgWorkspaceRepository::new(pool);
            Ok((Arc::new(repo.clone()), Arc::new(repo)))
        }
        Backend::Memory => {
            info!("Using in-memory workspace repository; data will not survive a restart");
            let repo = MemoryWorkspaceRepository::new();
            Ok((Arc::new(repo.clone()), Arc::new(repo)))
        }
        other => anyhow::bail!("{:?} is not a database backend", other),
    }
}

fn object_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let storage = &config.storage;
    let store: Arc<dyn ObjectStore> = match storage.backend {
        Backend::Local => Arc::new(LocalObjectStore::new(&storage.local_root, &storage.public_base_url)),
        Backend::Http => {
            let endpoint = storage
                .endpoint
                .clone()
                .context("STORAGE_ENDPOINT is required for the http storage backend")?;
            Arc::new(HttpObjectStore::new(
                endpoint,
                &storage.public_base_url,
                storage.token.clone(),
                Duration::from_secs(storage.request_timeout_secs),
            )?)
        }
        Backend::Memory => Arc::new(MemoryObjectStore::new(&storage.public_base_url)),
        other => anyhow::bail!("{:?} is not a storage backend", other),
    };
    info!(backend = ?storage.backend, base = %storage.public_base_url, "Object storage ready");
    Ok(store)
}

/// Convenience for binaries: build state with a fresh broadcast revalidator.
pub async fn state_from_config(config: Arc<AppConfig>) -> anyhow::Result<(AppState, BroadcastRevalidator)> {
    let revalidator = BroadcastRevalidator::default();
    let state = AppState::from_config(config, Arc::new(revalidator.clone())).await?;
    Ok((state, revalidator))
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(admin_routes(state.clone()))
        .merge(session_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    // Local blobs are served straight from disk
    if config.storage.backend == Backend::Local {
        if let Some(mount) = local_blob_mount(&config.storage.public_base_url) {
            router = router.nest_service(&mount, ServeDir::new(&config.storage.local_root));
        }
    }

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn session_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, workspaces};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/api/workspaces", get(workspaces::workspace_picker))
        .route("/api/w/:slug/settings", get(workspaces::workspace_settings))
        .route(
            "/api/workspaces/:id",
            axum::routing::put(workspaces::workspace_update).delete(workspaces::workspace_delete),
        )
        .route("/api/workspaces/:id/image", delete(workspaces::workspace_image_delete))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use elevated::admin;

    Router::new()
        .route(
            "/api/admin/workspaces",
            get(admin::admin_workspace_list).post(admin::admin_workspace_create),
        )
        .route(
            "/api/admin/workspaces/:id",
            get(admin::admin_workspace_show)
                .put(admin::admin_workspace_update)
                .delete(admin::admin_workspace_delete),
        )
        .route("/api/admin/workspaces/:id/image", delete(admin::admin_workspace_image_delete))
        // Layers run outside-in: authenticate first, then check the role
        .route_layer(middleware::from_fn(superadmin_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(origins)
}

/// Path component of the public blob URL, if it is a local mount like `/blobs`
fn local_blob_mount(public_base_url: &str) -> Option<String> {
    let parsed = url::Url::parse(public_base_url).ok()?;
    let path = parsed.path().trim_end_matches('/');
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_mount_comes_from_public_url() {
        assert_eq!(local_blob_mount("http://localhost:3000/blobs").as_deref(), Some("/blobs"));
        assert_eq!(local_blob_mount("http://localhost:3000/static/blobs/").as_deref(), Some("/static/blobs"));
        assert_eq!(local_blob_mount("http://localhost:3000"), None);
        assert_eq!(local_blob_mount("not a url"), None);
    }
}
