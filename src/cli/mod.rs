pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "wsadmin")]
#[command(about = "wsadmin - command-line client for the Workspace Admin API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "WSADMIN_SERVER", help = "API base URL (overrides saved config)")]
    pub server: Option<String>,

    #[arg(long, global = true, env = "WSADMIN_TOKEN", hide_env_values = true, help = "Bearer token (overrides saved config)")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Saved server and token settings")]
    Config {
        #[command(subcommand)]
        cmd: commands::config::ConfigCommands,
    },

    #[command(about = "Mint and inspect session tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Show the authenticated session")]
    Whoami,

    #[command(about = "Check server health")]
    Health,

    #[command(about = "Workspace administration")]
    Workspace {
        #[command(subcommand)]
        cmd: commands::workspace::WorkspaceCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let target = config::Target::resolve(cli.server, cli.token)?;

    match cli.command {
        Commands::Config { cmd } => commands::config::handle(cmd, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Whoami => commands::session::whoami(&target, output_format).await,
        Commands::Health => commands::session::health(&target, output_format).await,
        Commands::Workspace { cmd } => commands::workspace::handle(cmd, &target, output_format).await,
    }
}
