use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode};

use super::{key_from_url, validate_key, ObjectStore, StorageError};

/// Blob service reached over HTTP: `PUT {endpoint}/{key}` stores an object and
/// `DELETE {endpoint}/{key}` removes it. Objects are always addressed as
/// `public_base_url/{key}`, so every URL `put` returns maps back to its key.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    public_base_url: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(
        endpoint: impl Into<String>,
        public_base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        validate_key(key)?;
        let write_err = |reason: String| StorageError::Write {
            key: key.to_string(),
            reason,
        };

        let request = self
            .client
            .put(format!("{}/{}", self.endpoint, key))
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| write_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(write_err(format!("blob service answered {}", response.status())));
        }

        // Any URL in the response body is ignored; `delete` only understands our own.
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = key_from_url(&self.public_base_url, url)?;
        let delete_err = |reason: String| StorageError::Delete {
            url: url.to_string(),
            reason,
        };

        let request = self.client.delete(format!("{}/{}", self.endpoint, key));
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| delete_err(e.to_string()))?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            s => Err(delete_err(format!("blob service answered {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode as AxumStatus,
        routing::put,
        Json, Router,
    };
    use serde_json::{json, Value};

    type Seen = Arc<Mutex<Vec<String>>>;

    async fn stub_put(State(seen): State<Seen>, Path(key): Path<String>) -> Json<Value> {
        seen.lock().unwrap().push(format!("PUT {}", key));
        Json(json!({ "url": "https://cdn.vendor.example/abc.png" }))
    }

    async fn stub_delete(State(seen): State<Seen>, Path(key): Path<String>) -> AxumStatus {
        seen.lock().unwrap().push(format!("DELETE {}", key));
        AxumStatus::NO_CONTENT
    }

    /// Blob service that answers uploads with a URL of its own choosing
    async fn spawn_blob_service() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route("/blobs/*key", put(stub_put).delete(stub_delete))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}/blobs", addr), seen)
    }

    fn store() -> HttpObjectStore {
        HttpObjectStore::new(
            "http://127.0.0.1:9/blobs/",
            "https://cdn.example.com/",
            None,
            Duration::from_millis(200),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn foreign_urls_never_reach_the_network() {
        let err = store().delete("https://elsewhere.example.com/a.png").await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignUrl(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_write_error() {
        let err = store()
            .put("workspaces/w1/logo.png", vec![1], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
    }

    #[tokio::test]
    async fn returned_url_can_be_deleted_even_when_service_names_its_own() {
        let (endpoint, seen) = spawn_blob_service().await;
        let store = HttpObjectStore::new(endpoint, "https://cdn.example.com", None, Duration::from_secs(5)).unwrap();

        let url = store
            .put("workspaces/w1/logo.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/workspaces/w1/logo.png");

        store.delete(&url).await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["PUT workspaces/w1/logo.png", "DELETE workspaces/w1/logo.png"]
        );
    }
}
