//! REST collaborator contract and its HTTP implementation

use crate::cache::{CacheKey, Loader};
use crate::config::ClientConfig;
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// JSON-over-HTTP operations the core depends on
///
/// Paths are relative to the service root and include any query string,
/// e.g. `/posts?userId=1`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value>;

    async fn post_json(&self, path: &str, body: Value) -> Result<Value>;
}

/// [`Backend`] over `reqwest`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn read(path: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound {
                resource: path.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} answered HTTP {}", path, status.as_u16());
            return Err(SyncError::Fetch {
                resource: path.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {} - {}", status.as_u16(), body),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SyncError::fetch(path, format!("invalid JSON body: {}", e)))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_json(&self, path: &str) -> Result<Value> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.config.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SyncError::fetch(path, e.to_string()))?;

        Self::read(path, response).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value> {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.config.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::fetch(path, e.to_string()))?;

        Self::read(path, response).await
    }
}

/// Build a cache loader that GETs the key's path and maps the payload
pub fn loader<T>(backend: Arc<dyn Backend>, map: fn(Value) -> Result<T>) -> Loader<T>
where
    T: Send + 'static,
{
    Arc::new(move |key: CacheKey| {
        let backend = Arc::clone(&backend);
        async move {
            let value = backend.get_json(&key.path()).await?;
            map(value)
        }
        .boxed()
    })
}
