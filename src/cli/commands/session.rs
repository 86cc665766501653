use crate::cli::client::ApiClient;
use crate::cli::config::Target;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

pub async fn whoami(target: &Target, output_format: OutputFormat) -> anyhow::Result<()> {
    if target.token.is_none() {
        anyhow::bail!("no token; run `wsadmin config token <jwt>` or pass --token");
    }
    let data = ApiClient::new(target)?.get("/api/auth/whoami").await?;
    output_value(&output_format, &data)
}

pub async fn health(target: &Target, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = ApiClient::new(target)?.get("/health").await?;
    output_value(&output_format, &data)
}
