use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, validate_jwt, Claims, Role, Session};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a session token with the server's JWT secret")]
    Mint {
        #[arg(long, help = "User id (random when omitted)")]
        user_id: Option<Uuid>,

        #[arg(long, default_value = "user", help = "Global role: superadmin or user")]
        role: Role,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, default_value_t = 24, help = "Lifetime in hours")]
        hours: u64,

        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,
    },

    #[command(about = "Verify a token and print its claims")]
    Inspect {
        token: String,

        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint {
            user_id,
            role,
            name,
            email,
            hours,
            secret,
        } => {
            let mut session = Session::new(user_id.unwrap_or_else(Uuid::new_v4), role);
            session.name = name;
            session.email = email;

            let token = generate_jwt(&Claims::new(&session, hours), &secret)?;
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token minted",
                    Some(json!({ "token": token, "user_id": session.user_id, "role": session.role })),
                ),
                // bare token so it can be captured by the shell
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Inspect { token, secret } => {
            let claims = validate_jwt(&token, &secret)?;
            output_value(&output_format, &serde_json::to_value(&claims)?)
        }
    }
}
