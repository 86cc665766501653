#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{multipart, Method, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use workspace_admin::app::{app, AppState};
use workspace_admin::auth::{generate_jwt, Claims, Role, Session};
use workspace_admin::config::{AppConfig, Backend};
use workspace_admin::database::models::{NewWorkspace, Workspace, WorkspaceRole};
use workspace_admin::database::{MemoryWorkspaceRepository, WorkspaceRepository};
use workspace_admin::invalidation::BroadcastRevalidator;
use workspace_admin::services::{ImageReconciler, WorkspaceService};
use workspace_admin::storage::MemoryObjectStore;

pub const SECRET: &str = "integration-test-secret";
pub const BLOB_BASE: &str = "https://blobs.test";
pub const MAX_IMAGE_BYTES: usize = 64 * 1024;

/// In-process server on an ephemeral port with memory backends. The backends
/// are shared with the test so it can seed data and inspect side effects.
pub struct TestApp {
    pub base_url: String,
    pub repo: MemoryWorkspaceRepository,
    pub store: MemoryObjectStore,
    pub revalidator: BroadcastRevalidator,
    client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let mut config = AppConfig::development();
        config.database.backend = Backend::Memory;
        config.storage.backend = Backend::Memory;
        config.storage.public_base_url = BLOB_BASE.to_string();
        config.api.enable_request_logging = false;
        config.api.max_image_size_bytes = MAX_IMAGE_BYTES;
        config.security.jwt_secret = SECRET.to_string();

        let repo = MemoryWorkspaceRepository::new();
        let store = MemoryObjectStore::new(BLOB_BASE);
        let revalidator = BroadcastRevalidator::new(256);

        let service = WorkspaceService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            ImageReconciler::new(Arc::new(store.clone())),
            Arc::new(revalidator.clone()),
            config.api.max_image_size_bytes,
        );
        let router = app(AppState::new(Arc::new(config), service));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Ok(Self {
            base_url,
            repo,
            store,
            revalidator,
            client: reqwest::Client::new(),
        })
    }

    pub fn token_for(&self, session: &Session) -> String {
        generate_jwt(&Claims::new(session, 1), SECRET).expect("sign test token")
    }

    /// A fresh superadmin session and its bearer token
    pub fn superadmin(&self) -> (Session, String) {
        let session = Session::new(Uuid::new_v4(), Role::Superadmin);
        let token = self.token_for(&session);
        (session, token)
    }

    /// A fresh ordinary user session and its bearer token
    pub fn user(&self) -> (Session, String) {
        let session = Session::new(Uuid::new_v4(), Role::User);
        let token = self.token_for(&session);
        (session, token)
    }

    pub async fn seed_workspace(&self, name: &str, slug: &str, with_image: bool) -> Result<Workspace> {
        let ws = self
            .repo
            .insert(NewWorkspace {
                name: name.to_string(),
                slug: slug.to_string(),
                description: None,
            })
            .await?;
        if !with_image {
            return Ok(ws);
        }
        let url = self.store.seed(&format!("workspaces/{}/seed.png", ws.id), b"seed-image");
        Ok(self.repo.set_image(ws.id, Some(url)).await?)
    }

    pub async fn add_member(&self, workspace_id: Uuid, session: &Session, role: WorkspaceRole) {
        self.repo.add_member(workspace_id, session.user_id, role).await;
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(self.request(Method::GET, path, token)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(self.request(Method::DELETE, path, token)).await
    }

    pub async fn send_form(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        form: multipart::Form,
    ) -> Result<(StatusCode, Value)> {
        self.send(self.request(method, path, token).multipart(form)).await
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let request = self.client.request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, Value)> {
        let res = request.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }
}

/// Multipart workspace form as a browser would submit it
pub fn form(name: &str, slug: &str) -> multipart::Form {
    multipart::Form::new()
        .text("name", name.to_string())
        .text("slug", slug.to_string())
        .text("description", "")
}

pub fn with_image(form: multipart::Form, bytes: Vec<u8>, content_type: &str) -> multipart::Form {
    let part = multipart::Part::bytes(bytes)
        .file_name("upload")
        .mime_str(content_type)
        .expect("valid mime");
    form.part("image", part)
}

pub fn png(len: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len.max(8), 0);
    bytes
}
