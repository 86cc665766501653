mod common;

use anyhow::Result;
use reqwest::StatusCode;
use workspace_admin::database::models::WorkspaceRole;

use common::TestApp;

#[tokio::test]
async fn picker_lists_memberships_and_marks_current() -> Result<()> {
    let app = TestApp::spawn().await?;
    let acme = app.seed_workspace("Acme Corp", "acme", true).await?;
    let globex = app.seed_workspace("Globex", "globex", false).await?;
    app.seed_workspace("Initech", "initech", false).await?;
    let (user, token) = app.user();
    app.add_member(acme.id, &user, WorkspaceRole::Admin).await;
    app.add_member(globex.id, &user, WorkspaceRole::Member).await;

    let (status, res) = app.get("/api/workspaces?path=/w/globex/settings", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);

    let view = &res["data"];
    assert_eq!(view["label"], "Globex");
    assert_eq!(view["current"], "globex");
    let entries = view["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    let current: Vec<_> = entries.iter().filter(|e| e["current"] == true).collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0]["slug"], "globex");
    Ok(())
}

#[tokio::test]
async fn picker_filters_by_query() -> Result<()> {
    let app = TestApp::spawn().await?;
    let acme = app.seed_workspace("Acme Corp", "acme", false).await?;
    let globex = app.seed_workspace("Globex", "globex-intl", false).await?;
    let (user, token) = app.user();
    app.add_member(acme.id, &user, WorkspaceRole::Member).await;
    app.add_member(globex.id, &user, WorkspaceRole::Member).await;

    let (_, res) = app.get("/api/workspaces?q=INTL", Some(&token)).await?;
    let entries = res["data"]["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Globex");
    assert_eq!(entries[0]["initials"], "GL");

    let (_, res) = app.get("/api/workspaces?q=nothing-matches", Some(&token)).await?;
    assert!(res["data"]["entries"].as_array().expect("entries").is_empty());
    assert_eq!(res["data"]["label"], "Select workspace");
    Ok(())
}

#[tokio::test]
async fn picker_without_memberships_is_empty() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.seed_workspace("Acme", "acme", false).await?;
    let (_, token) = app.user();

    let (status, res) = app.get("/api/workspaces?path=/w/acme", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(res["data"]["entries"].as_array().expect("entries").is_empty());
    assert!(res["data"]["current"].is_null());
    Ok(())
}

#[tokio::test]
async fn superadmin_picker_covers_every_workspace() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.seed_workspace("Acme", "acme", false).await?;
    app.seed_workspace("Globex", "globex", false).await?;
    let (_, token) = app.superadmin();

    let (_, res) = app.get("/api/workspaces", Some(&token)).await?;
    assert_eq!(res["data"]["entries"].as_array().map(Vec::len), Some(2));
    Ok(())
}
