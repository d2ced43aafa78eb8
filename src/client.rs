//! Automation server HTTP client.

use crate::error::{AppError, Result};
use crate::export::{ExportRequest, ExportResponse};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Server version payload.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    pub version: String,
}

/// Remote seam for the bulk export/import endpoints.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Bulk export: sparse inclusion set in, per-category records out.
    async fn export_data(&self, request: &ExportRequest) -> Result<ExportResponse>;

    /// Bulk import of a previously exported document. The acknowledgment
    /// body is opaque to the orchestrator.
    async fn import_data(&self, body: &Value) -> Result<Value>;

    async fn version(&self) -> Result<VersionInfo>;
}

/// HTTP client for the automation server's admin API.
///
/// Requests carry the internal-origin marker header the server expects;
/// authenticated deployments add a bearer token.
pub struct AdminClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{base}/api/v1{path}", base = base_url.trim_end_matches('/'))
}

impl AdminClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The server URL (e.g., "http://localhost:3000")
    /// * `timeout_secs` - Per-request timeout
    /// * `token` - Optional bearer token
    pub fn new(base_url: &str, timeout_secs: u64, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.to_string(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, endpoint(&self.base_url, path))
            .header("x-request-from", "internal");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Turn a non-success response into a remote rejection.
    ///
    /// Prefers the structured `message` field of a JSON body, then the raw
    /// body text; an empty body carries no message and the notification
    /// layer falls back to its per-operation default.
    async fn rejection(response: reqwest::Response) -> AppError {
        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .or(Some(body))
        };
        AppError::Remote { message }
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn export_data(&self, request: &ExportRequest) -> Result<ExportResponse> {
        let response = self
            .request(Method::POST, "/export-import/export")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json().await?)
    }

    async fn import_data(&self, body: &Value) -> Result<Value> {
        let response = self
            .request(Method::POST, "/export-import/import")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        // Some server versions acknowledge with an empty body.
        let text = response.text().await?;
        if text.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    async fn version(&self) -> Result<VersionInfo> {
        let response = self.request(Method::GET, "/version").send().await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json().await?)
    }
}
