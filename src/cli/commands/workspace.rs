use std::path::PathBuf;

use clap::{Args, Subcommand};
use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use crate::cli::client::{workspace_form, ApiClient};
use crate::cli::config::Target;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Args)]
pub struct FormArgs {
    #[arg(long, help = "Display name")]
    pub name: String,

    #[arg(long, help = "URL slug: lowercase letters, digits and hyphens")]
    pub slug: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, help = "Branding image to upload")]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum WorkspaceCommands {
    #[command(about = "List all workspaces (superadmin)")]
    List,

    #[command(about = "Show one workspace (superadmin)")]
    Show { id: Uuid },

    #[command(about = "Create a workspace (superadmin)")]
    Create {
        #[command(flatten)]
        form: FormArgs,
    },

    #[command(about = "Update a workspace; --as-admin uses your workspace admin membership")]
    Update {
        id: Uuid,

        #[command(flatten)]
        form: FormArgs,

        #[arg(long)]
        as_admin: bool,
    },

    #[command(about = "Delete a workspace and its image")]
    Delete {
        id: Uuid,

        #[arg(long)]
        as_admin: bool,
    },

    #[command(about = "Remove a workspace's image")]
    DeleteImage {
        id: Uuid,

        #[arg(long)]
        as_admin: bool,
    },

    #[command(about = "Workspaces you belong to, as the picker shows them")]
    Mine {
        #[arg(long, short, help = "Filter by name or slug")]
        query: Option<String>,

        #[arg(long, help = "Mark the workspace addressed by this path, e.g. /w/acme")]
        path: Option<String>,
    },

    #[command(about = "Workspace settings by slug (workspace admin)")]
    Settings { slug: String },
}

/// Route for a workspace operation on the chosen tier
fn workspace_path(id: Uuid, as_admin: bool) -> String {
    if as_admin {
        format!("/api/workspaces/{}", id)
    } else {
        format!("/api/admin/workspaces/{}", id)
    }
}

pub async fn handle(cmd: WorkspaceCommands, target: &Target, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(target)?;

    match cmd {
        WorkspaceCommands::List => {
            let data = client.get("/api/admin/workspaces").await?;
            let rows = data.as_array().cloned().unwrap_or_default();
            output_workspaces(&output_format, &rows)
        }
        WorkspaceCommands::Show { id } => {
            let data = client.get(&workspace_path(id, false)).await?;
            output_value(&output_format, &data)
        }
        WorkspaceCommands::Create { form } => {
            let body = build_form(&form).await?;
            let data = client.send_form(Method::POST, "/api/admin/workspaces", body).await?;
            report(&output_format, data)
        }
        WorkspaceCommands::Update { id, form, as_admin } => {
            let body = build_form(&form).await?;
            let data = client.send_form(Method::PUT, &workspace_path(id, as_admin), body).await?;
            report(&output_format, data)
        }
        WorkspaceCommands::Delete { id, as_admin } => {
            let data = client.delete(&workspace_path(id, as_admin)).await?;
            report(&output_format, data)
        }
        WorkspaceCommands::DeleteImage { id, as_admin } => {
            let path = format!("{}/image", workspace_path(id, as_admin));
            let data = client.delete(&path).await?;
            report(&output_format, data)
        }
        WorkspaceCommands::Mine { query, path } => {
            let mut params = Vec::new();
            if let Some(q) = query {
                params.push(("q", q));
            }
            if let Some(p) = path {
                params.push(("path", p));
            }
            let view = client.get_with_query("/api/workspaces", &params).await?;

            match output_format {
                OutputFormat::Json => output_value(&output_format, &view),
                OutputFormat::Text => {
                    println!("{}", display(&view["label"]));
                    for entry in view["entries"].as_array().into_iter().flatten() {
                        let marker = if entry["current"].as_bool() == Some(true) { "*" } else { " " };
                        println!(
                            "{} [{}] {:<25} {:<20} {}",
                            marker,
                            display(&entry["initials"]),
                            display(&entry["name"]),
                            display(&entry["slug"]),
                            display(&entry["role"]),
                        );
                    }
                    Ok(())
                }
            }
        }
        WorkspaceCommands::Settings { slug } => {
            let data = client.get(&format!("/api/w/{}/settings", slug)).await?;
            output_value(&output_format, &data)
        }
    }
}

async fn build_form(form: &FormArgs) -> anyhow::Result<reqwest::multipart::Form> {
    workspace_form(&form.name, &form.slug, form.description.as_deref(), form.image.as_deref()).await
}

/// Print an action outcome, surfacing storage cleanup warnings on stderr
fn report(output_format: &OutputFormat, data: Value) -> anyhow::Result<()> {
    let message = data["message"].as_str().unwrap_or("Done").to_string();

    if let OutputFormat::Text = output_format {
        for warning in data["warnings"].as_array().into_iter().flatten() {
            eprintln!("warning: {}", display(warning));
        }
    }
    output_success(output_format, &message, Some(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_selects_route() {
        let id = Uuid::nil();
        assert_eq!(workspace_path(id, false), format!("/api/admin/workspaces/{}", id));
        assert_eq!(workspace_path(id, true), format!("/api/workspaces/{}", id));
    }
}
