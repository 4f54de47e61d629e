//! Shared HTTP client for the publications backend.
//!
//! Wraps `reqwest` with bearer-token injection, a single
//! error-normalization path, and a dedicated multipart upload call with its
//! own longer timeout. On HTTP 401 the persisted session is cleared, the
//! login redirect fires, and the call fails with
//! [`ClientError::Unauthorized`]; that side-effecting path runs at most once
//! per response. No retries happen at this layer: one request, one attempt.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::contract::{LoginRedirect, SessionStore};
use crate::error::{ClientError, Result};

/// Fallback shown when a failed response carries no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Request failed. Please try again.";

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    upload_client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    redirect: Arc<dyn LoginRedirect>,
}

impl ApiClient {
    pub fn new(
        config: &Config,
        session: Arc<dyn SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let upload_client = Client::builder().timeout(config.upload_timeout).build()?;
        Ok(Self {
            client,
            upload_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            redirect,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, if a session is persisted. Read per call so
    /// a login/logout in the same process takes effect immediately.
    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.load() {
            Some(session) => request.bearer_auth(session.token),
            None => request,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.apply_auth(self.client.get(self.build_url(path)));
        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.apply_auth(self.client.put(self.build_url(path)).json(body));
        let response = self.check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.apply_auth(self.client.delete(self.build_url(path)));
        self.check(request.send().await?).await?;
        Ok(())
    }

    /// Multipart upload on the long-timeout client. Returns the raw JSON
    /// body so the upload service can normalize whichever shape the backend
    /// chose to answer in; an empty 2xx body is a shape failure.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value> {
        let request = self.apply_auth(self.upload_client.post(self.build_url(path)).multipart(form));
        let response = self.check(request.send().await?).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(ClientError::shape("empty response body from upload"));
        }
        serde_json::from_str(&body)
            .map_err(|e| ClientError::shape(format!("upload response is not JSON: {e}")))
    }

    /// The single response-normalization path every call goes through.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "Received 401, clearing session and redirecting to login");
            self.session.clear();
            self.redirect.redirect_to_login();
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body);
            warn!(status = %status, url = %url, message = %message, "Request failed");
            return Err(ClientError::http(status.as_u16(), message));
        }
        debug!(status = %status, "Request succeeded");
        Ok(response)
    }
}

/// Pull a human-readable message out of a failed response body.
///
/// Priority order: plain string body, then the `message`, `error` and
/// `details` fields of a JSON object, then a generic fallback.
pub fn extract_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return GENERIC_ERROR_MESSAGE.to_string();
    }
    let parsed: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        // Not JSON at all: the body itself is the message.
        Err(_) => return trimmed.to_string(),
    };
    match parsed {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Object(map) => ["message", "error", "details"]
            .iter()
            .find_map(|key| {
                map.get(*key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}
