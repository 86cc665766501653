use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use reqwest::{multipart, Method, RequestBuilder, Response};
use serde_json::Value;

use crate::cli::config::Target;

/// Thin wrapper over the JSON envelope the API answers with.
pub struct ApiClient {
    http: reqwest::Client,
    target: Target,
}

impl ApiClient {
    pub fn new(target: &Target) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            target: target.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.target.url(path));
        match &self.target.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.request(Method::DELETE, path)).await
    }

    pub async fn send_form(&self, method: Method, path: &str, form: multipart::Form) -> anyhow::Result<Value> {
        self.send(self.request(method, path).multipart(form)).await
    }

    async fn send(&self, request: RequestBuilder) -> anyhow::Result<Value> {
        let response = request
            .send()
            .await
            .with_context(|| format!("could not reach {}", self.target.server))?;
        unwrap_envelope(response).await
    }
}

/// `data` of a success envelope, or an error built from `message`/`code`.
async fn unwrap_envelope(response: Response) -> anyhow::Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("server answered {} with a non-JSON body", status))?;

    if status.is_success() && body.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(body.get("data").cloned().unwrap_or(Value::Null));
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    let code = body.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
    let mut error = format!("{} ({}, HTTP {})", message, code, status.as_u16());

    if let Some(fields) = body.get("field_errors").and_then(Value::as_object) {
        for (field, reason) in fields {
            error.push_str(&format!("\n  {}: {}", field, reason.as_str().unwrap_or_default()));
        }
    }
    Err(anyhow::anyhow!(error))
}

/// Build the multipart workspace form. Only the fields given are sent.
pub async fn workspace_form(
    name: &str,
    slug: &str,
    description: Option<&str>,
    image: Option<&Path>,
) -> anyhow::Result<multipart::Form> {
    let mut form = multipart::Form::new()
        .text("name", name.to_string())
        .text("slug", slug.to_string());

    if let Some(description) = description {
        form = form.text("description", description.to_string());
    }

    if let Some(path) = image {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_content_type(path))?;
        form = form.part("image", part);
    }

    Ok(form)
}

/// Content type from the file extension; unknown types are sent as-is and
/// rejected by the server.
pub fn image_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(image_content_type(Path::new("logo.PNG")), "image/png");
        assert_eq!(image_content_type(Path::new("a/b/photo.jpeg")), "image/jpeg");
        assert_eq!(image_content_type(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(image_content_type(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn missing_image_file_is_reported() {
        let err = workspace_form("Acme", "acme", None, Some(Path::new("/nonexistent/logo.png")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("could not read"));
    }
}
