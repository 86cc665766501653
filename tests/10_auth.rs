mod common;

use anyhow::Result;
use reqwest::StatusCode;
use uuid::Uuid;
use workspace_admin::auth::{generate_jwt, Claims, Role, Session};
use workspace_admin::database::WorkspaceRepository;

use common::TestApp;

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = app.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn whoami_requires_a_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.get("/api/auth/whoami", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/auth/whoami", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let session = Session::new(Uuid::new_v4(), Role::Superadmin);
    let forged = generate_jwt(&Claims::new(&session, 1), "some-other-secret")?;

    let (status, _) = app.get("/api/admin/workspaces", Some(&forged)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn whoami_reports_role_and_landing() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (root, token) = app.superadmin();
    let (status, body) = app.get("/api/auth/whoami", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], root.user_id.to_string());
    assert_eq!(body["data"]["role"], "superadmin");
    assert_eq!(body["data"]["superadmin"], true);
    assert_eq!(body["data"]["landing"], "/admin");

    let (_, token) = app.user();
    let (_, body) = app.get("/api/auth/whoami", Some(&token)).await?;
    assert_eq!(body["data"]["superadmin"], false);
    assert_eq!(body["data"]["landing"], "/workspaces");
    Ok(())
}

#[tokio::test]
async fn admin_surface_is_closed_to_ordinary_users() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ws = app.seed_workspace("Acme", "acme", true).await?;
    let (_, token) = app.user();
    let writes = app.repo.write_count();

    let (status, body) = app.get("/api/admin/workspaces", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");

    let (status, _) = app
        .delete(&format!("/api/admin/workspaces/{}", ws.id), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // nothing was touched
    assert!(app.store.calls().is_empty());
    assert_eq!(app.repo.write_count(), writes);
    assert!(app.repo.find_by_id(ws.id).await?.is_some());
    Ok(())
}
