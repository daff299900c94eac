//! REST client for the Nano Banana HTTP endpoints.
//!
//! Wraps job creation, status reads, uploads and the account/catalog
//! reads using [`reqwest`]. Non-2xx responses are turned into
//! [`RequestError::Api`] carrying the server's `message` when present.

use std::time::Duration;

use async_trait::async_trait;
use banana_core::account::{AuthToken, GalleryItem, Plan, ProfileUpdate, UploadResponse, User};
use banana_core::types::AssetId;
use banana_core::{Asset, EditRequest, GenerationRequest, Job};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::job_api::JobApi;

/// Message used when an error response has no parseable body.
const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// HTTP client for one API deployment.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

/// Optional error payload of a non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Build a client from configuration, applying the request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::with_client(
            client,
            config.api_url.clone(),
            config.token.clone(),
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Replace the bearer credential, e.g. after [`login`](Self::login).
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Exchange credentials for a bearer token. Sent without
    /// `Authorization`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken, RequestError> {
        let endpoint = "/auth/login";
        let request = self
            .client
            .post(self.url(endpoint))
            .json(&LoginBody { email, password });

        self.send(request, endpoint).await
    }

    /// The signed-in user.
    pub async fn me(&self) -> Result<User, RequestError> {
        let endpoint = "/me";
        let request = self.authorize(self.client.get(self.url(endpoint)));
        self.send(request, endpoint).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, RequestError> {
        let endpoint = "/me/profile";
        let request = self.authorize(self.client.put(self.url(endpoint)).json(update));
        self.send(request, endpoint).await
    }

    /// Images saved to the signed-in user's library.
    pub async fn gallery(&self) -> Result<Vec<GalleryItem>, RequestError> {
        let endpoint = "/gallery/mine";
        let request = self.authorize(self.client.get(self.url(endpoint)));
        self.send(request, endpoint).await
    }

    pub async fn plans(&self) -> Result<Vec<Plan>, RequestError> {
        let endpoint = "/billing/plans";
        let request = self.authorize(self.client.get(self.url(endpoint)));
        self.send(request, endpoint).await
    }

    // ---- private helpers ----

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_url, endpoint)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<T, RequestError> {
        tracing::debug!(endpoint, "Sending API request");
        let response = request.send().await?;
        Self::parse_response(response, endpoint).await
    }

    /// Ensure the response has a success status code. On failure, the
    /// error message is the body's `message`, else a status-derived or
    /// generic fallback.
    async fn ensure_success(
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<reqwest::Response, RequestError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!(endpoint, status = status.as_u16(), message = %message, "API request failed");

        Err(RequestError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a success body, or `None` for `204 No Content`.
    async fn parse_optional<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<Option<T>, RequestError> {
        let response = Self::ensure_success(response, endpoint).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RequestError::Decode {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<T, RequestError> {
        Self::parse_optional(response, endpoint)
            .await?
            .ok_or_else(|| RequestError::EmptyBody {
                endpoint: endpoint.to_string(),
            })
    }
}

/// Derive the display message for a non-2xx response body.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
        }) if !message.is_empty() => message,
        Ok(_) => format!(
            "API error: {}",
            status.canonical_reason().unwrap_or(status.as_str())
        ),
        Err(_) => UNKNOWN_ERROR.to_string(),
    }
}

#[async_trait]
impl JobApi for ApiClient {
    async fn create_generation_job(
        &self,
        request: &GenerationRequest,
    ) -> Result<Job, RequestError> {
        let endpoint = "/generate";
        let builder = self.authorize(self.client.post(self.url(endpoint)).json(request));
        self.send(builder, endpoint).await
    }

    async fn create_edit_job(&self, request: &EditRequest) -> Result<Job, RequestError> {
        let endpoint = "/edit";
        let builder = self.authorize(self.client.post(self.url(endpoint)).json(request));
        self.send(builder, endpoint).await
    }

    async fn upload_asset(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<AssetId, RequestError> {
        let endpoint = "/upload";
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let builder = self.authorize(self.client.post(self.url(endpoint)).multipart(form));

        let response: UploadResponse = self.send(builder, endpoint).await?;
        Ok(response.asset_id)
    }

    async fn get_job(&self, job_id: &str) -> Result<Job, RequestError> {
        let endpoint = format!("/jobs/{job_id}");
        let builder = self.authorize(self.client.get(self.url(&endpoint)));
        self.send(builder, &endpoint).await
    }

    async fn get_asset(&self, asset_id: &str) -> Result<Asset, RequestError> {
        let endpoint = format!("/assets/{asset_id}");
        let builder = self.authorize(self.client.get(self.url(&endpoint)));
        self.send(builder, &endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_body_message() {
        let msg = error_message(StatusCode::TOO_MANY_REQUESTS, r#"{"message":"rate limited"}"#);
        assert_eq!(msg, "rate limited");
    }

    #[test]
    fn error_message_without_message_field_uses_status_text() {
        let msg = error_message(StatusCode::BAD_GATEWAY, r#"{"detail":"upstream"}"#);
        assert_eq!(msg, "API error: Bad Gateway");

        let msg = error_message(StatusCode::BAD_GATEWAY, r#"{"message":""}"#);
        assert_eq!(msg, "API error: Bad Gateway");
    }

    #[test]
    fn error_message_unparseable_body_is_generic() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(msg, UNKNOWN_ERROR);
        assert_eq!(error_message(StatusCode::INTERNAL_SERVER_ERROR, ""), UNKNOWN_ERROR);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let api = ApiClient::with_client(
            reqwest::Client::new(),
            "http://host/api/".into(),
            None,
        );
        assert_eq!(api.url("/jobs/j1"), "http://host/api/jobs/j1");
    }
}
