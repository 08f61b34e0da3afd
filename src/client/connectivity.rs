
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{extract_error_message, AuthError, AuthResult};
use crate::identity::{AuthTransport, Credentials, Identity};

/// HTTP client bound to one backend. The cookie jar is shared by every clone,
/// so a session cookie set by `/auth/login` or `/auth/refresh` is attached to
/// all later requests without the caller seeing it.
#[derive(Clone)]
pub struct HttpTransport {
    base: Url,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").field("base", &self.base.as_str()).finish()
    }
}

impl HttpTransport {
    pub fn new(base: &str) -> Result<Self> {
        let base_url = Url::parse(base).context("invalid base URL")?;
        Self::with_timeout(base_url, SessionConfig::default().timeout)
    }

    pub fn from_config(cfg: &SessionConfig) -> Result<Self> {
        let base = cfg.api_url.clone().ok_or_else(|| anyhow!("no backend URL configured"))?;
        Self::with_timeout(base, cfg.timeout)
    }

    pub fn with_timeout(mut base: Url, timeout: Duration) -> Result<Self> {
        // Relative joins drop the last path segment unless it ends with '/'.
        if !base.path().ends_with('/') {
            let p = format!("{}/", base.path());
            base.set_path(&p);
        }
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url { &self.base }

    pub fn endpoint(&self, path: &str) -> AuthResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AuthError::network(format!("invalid endpoint '{}': {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AuthResult<T> {
        let url = self.endpoint(path)?;
        self.send_json(self.client.get(url)).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> AuthResult<T> {
        let url = self.endpoint(path)?;
        self.send_json(self.client.post(url).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> AuthResult<T> {
        let url = self.endpoint(path)?;
        self.send_json(self.client.put(url).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> AuthResult<()> {
        let url = self.endpoint(path)?;
        self.send_empty(self.client.delete(url)).await
    }

    async fn dispatch(&self, req: RequestBuilder) -> AuthResult<reqwest::Response> {
        let resp = req.send().await?;
        let status = resp.status();
        debug!(target: "storefront::http", "{} {}", status.as_u16(), resp.url().path());
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(AuthError::from_status(status.as_u16(), extract_error_message(&body)))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> AuthResult<T> {
        let resp = self.dispatch(req).await?;
        resp.json::<T>()
            .await
            .map_err(|e| AuthError::network(format!("invalid response body: {}", e)))
    }

    async fn send_empty(&self, req: RequestBuilder) -> AuthResult<()> {
        self.dispatch(req).await.map(|_| ())
    }
}

#[async_trait]
impl AuthTransport for HttpTransport {
    async fn login(&self, credentials: &Credentials) -> AuthResult<Identity> {
        self.post("auth/login", &serde_json::json!({ "auth": credentials })).await
    }

    async fn logout(&self) -> AuthResult<()> {
        let url = self.endpoint("auth/logout")?;
        self.send_empty(self.client.post(url).json(&serde_json::json!({}))).await
    }

    async fn refresh(&self) -> AuthResult<Identity> {
        self.post("auth/refresh", &serde_json::json!({})).await
    }
}
