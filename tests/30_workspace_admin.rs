mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use workspace_admin::database::models::WorkspaceRole;
use workspace_admin::database::WorkspaceRepository;

use common::{form, png, with_image, TestApp};

#[tokio::test]
async fn workspace_admin_updates_through_membership() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ws = app.seed_workspace("Acme", "acme", true).await?;
    let (admin, token) = app.user();
    app.add_member(ws.id, &admin, WorkspaceRole::Admin).await;

    let body = with_image(form("Acme Labs", "acme"), png(200), "image/webp");
    let (status, res) = app
        .send_form(Method::PUT, &format!("/api/workspaces/{}", ws.id), Some(&token), body)
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["workspace"]["name"], "Acme Labs");
    let url = res["data"]["workspace"]["image"].as_str().expect("url");
    assert!(url.ends_with(".webp"));
    assert!(!app.store.contains(ws.image.as_deref().unwrap()));
    Ok(())
}

#[tokio::test]
async fn members_and_outsiders_are_refused_without_side_effects() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ws = app.seed_workspace("Acme", "acme", true).await?;
    let (member, member_token) = app.user();
    app.add_member(ws.id, &member, WorkspaceRole::Member).await;
    let (_, outsider_token) = app.user();
    // the global role does not grant the workspace tier
    let (_, root_token) = app.superadmin();
    let writes = app.repo.write_count();

    for token in [&member_token, &outsider_token, &root_token] {
        let body = with_image(form("Hijacked", "acme"), png(64), "image/png");
        let (status, res) = app
            .send_form(Method::PUT, &format!("/api/workspaces/{}", ws.id), Some(token), body)
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(res["message"], "You do not have permission to update this workspace");

        let (status, _) = app.delete(&format!("/api/workspaces/{}/image", ws.id), Some(token)).await?;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.delete(&format!("/api/workspaces/{}", ws.id), Some(token)).await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    assert!(app.store.calls().is_empty());
    assert_eq!(app.repo.write_count(), writes);
    assert_eq!(app.repo.find_by_id(ws.id).await?, Some(ws));
    Ok(())
}

#[tokio::test]
async fn settings_are_resolved_by_slug() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ws = app.seed_workspace("Acme", "acme", false).await?;
    let (admin, admin_token) = app.user();
    app.add_member(ws.id, &admin, WorkspaceRole::Admin).await;
    let (member, member_token) = app.user();
    app.add_member(ws.id, &member, WorkspaceRole::Member).await;

    let (status, res) = app.get("/api/w/acme/settings", Some(&admin_token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["id"], ws.id.to_string());

    let (status, _) = app.get("/api/w/acme/settings", Some(&member_token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/w/nope/settings", Some(&admin_token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn workspace_admin_can_remove_image_and_workspace() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ws = app.seed_workspace("Acme", "acme", true).await?;
    let (admin, token) = app.user();
    app.add_member(ws.id, &admin, WorkspaceRole::Admin).await;

    let (status, res) = app.delete(&format!("/api/workspaces/{}/image", ws.id), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(res["data"]["workspace"]["image"].is_null());

    // second removal is a no-op that never reaches storage
    let calls = app.store.calls().len();
    let (status, res) = app.delete(&format!("/api/workspaces/{}/image", ws.id), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["message"], "Workspace has no image");
    assert_eq!(app.store.calls().len(), calls);

    let (status, _) = app.delete(&format!("/api/workspaces/{}", ws.id), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(app.repo.find_by_id(ws.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn slug_change_must_stay_unique() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ws = app.seed_workspace("Acme", "acme", false).await?;
    app.seed_workspace("Globex", "globex", false).await?;
    let (admin, token) = app.user();
    app.add_member(ws.id, &admin, WorkspaceRole::Admin).await;

    let (status, _) = app
        .send_form(Method::PUT, &format!("/api/workspaces/{}", ws.id), Some(&token), form("Acme", "globex"))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, res) = app
        .send_form(Method::PUT, &format!("/api/workspaces/{}", ws.id), Some(&token), form("Acme", "acme-2"))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"]["workspace"]["slug"], "acme-2");
    Ok(())
}
