use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show saved settings")]
    Show,

    #[command(about = "Save the API base URL")]
    Server {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Save a bearer token")]
    Token {
        #[arg(help = "JWT issued for your session")]
        token: String,
    },

    #[command(about = "Forget the saved token")]
    Logout,
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut env_config = load_environment_config()?;

    match cmd {
        ConfigCommands::Show => {
            let details = json!({
                "server": env_config.server.as_deref().unwrap_or(DEFAULT_SERVER),
                "token": env_config.token.as_ref().map(|_| "(saved)"),
                "config_dir": get_config_dir()?.display().to_string(),
            });
            output_value(&output_format, &details)
        }
        ConfigCommands::Server { url } => {
            let url = url.trim_end_matches('/').to_string();
            url::Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid server URL '{}': {}", url, e))?;
            env_config.server = Some(url.clone());
            save_environment_config(&env_config)?;
            output_success(&output_format, &format!("Server set to {}", url), Some(json!({ "server": url })))
        }
        ConfigCommands::Token { token } => {
            env_config.token = Some(token);
            save_environment_config(&env_config)?;
            output_success(&output_format, "Token saved", None)
        }
        ConfigCommands::Logout => {
            env_config.token = None;
            save_environment_config(&env_config)?;
            output_success(&output_format, "Token removed", None)
        }
    }
}
