use reqwest::Method;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::user::AccessToken;

/// Client for the upstream REST API that owns all business data.
///
/// Every proxy handler funnels through here: one generic forward for JSON
/// requests, one for multipart, plus a typed fetch for the few payloads this
/// service consumes itself. Calls are made at most once, with no retries;
/// an upstream error status is relayed to the caller, not masked.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Creates a client for the given API base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Forwards a JSON request on behalf of a signed-in user.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method to use upstream.
    /// * `path` - The upstream path, starting with `/`.
    /// * `token` - The user's upstream bearer credential.
    /// * `body` - Optional JSON body to forward.
    ///
    /// # Returns
    ///
    /// The upstream JSON payload on success; `AppError::Upstream` carrying
    /// the upstream status and payload otherwise.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        token: &AccessToken,
        body: Option<&sonic_rs::Value>,
    ) -> Result<sonic_rs::Value> {
        let call_id = Uuid::new_v4();
        tracing::debug!("📡 [{}] {} {}", call_id, method, path);

        let mut request = self
            .client
            .request(method, self.endpoint(path))
            .bearer_auth(token.reveal());

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        tracing::debug!("📡 [{}] upstream answered {}", call_id, response.status());

        self.into_json(response).await
    }

    /// Forwards a multipart form (file upload) on behalf of a signed-in user.
    pub async fn forward_multipart(
        &self,
        path: &str,
        token: &AccessToken,
        form: reqwest::multipart::Form,
    ) -> Result<sonic_rs::Value> {
        let call_id = Uuid::new_v4();
        tracing::debug!("📡 [{}] POST {} (multipart)", call_id, path);

        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(token.reveal())
            .multipart(form)
            .send()
            .await?;

        tracing::debug!("📡 [{}] upstream answered {}", call_id, response.status());

        self.into_json(response).await
    }

    /// Fetches and decodes a payload this service consumes itself.
    ///
    /// A 2xx body that fails to decode is an upstream contract violation,
    /// reported as such rather than passed along untyped.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, token: &AccessToken) -> Result<T> {
        let response = self
            .client
            .get(self.endpoint(path))
            .bearer_auth(token.reveal())
            .send()
            .await?;

        let bytes = self.success_bytes(response).await?;

        sonic_rs::from_slice(&bytes)
            .map_err(|e| AppError::UpstreamContract(format!("GET {}: {}", path, e)))
    }

    /// POSTs to an endpoint that requires no session (login, forgot-password)
    /// and decodes the response.
    pub async fn post_public<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &sonic_rs::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;

        let bytes = self.success_bytes(response).await?;

        sonic_rs::from_slice(&bytes)
            .map_err(|e| AppError::UpstreamContract(format!("POST {}: {}", path, e)))
    }

    async fn into_json(&self, response: reqwest::Response) -> Result<sonic_rs::Value> {
        let bytes = self.success_bytes(response).await?;

        if bytes.is_empty() {
            return Ok(sonic_rs::json!({}));
        }

        sonic_rs::from_slice(&bytes)
            .map_err(|e| AppError::UpstreamContract(format!("2xx body was not JSON: {}", e)))
    }

    async fn success_bytes(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let payload = sonic_rs::from_slice(&bytes).ok();
            return Err(AppError::Upstream { status, payload });
        }

        Ok(bytes.to_vec())
    }
}
