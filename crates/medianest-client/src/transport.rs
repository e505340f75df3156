//! Transport of folder actions to the server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use medianest_core::error::{AppError, ErrorKind};
use medianest_core::result::AppResult;
use medianest_entity::action::{ActionResponse, FolderAction};

/// Sends one action and returns the `data` payload of a successful reply.
/// A failed reply comes back as an `AppError` with the server's code.
#[async_trait]
pub trait FolderTransport: Send + Sync {
    /// Perform the request.
    async fn call(&self, action: &FolderAction) -> AppResult<Value>;
}

/// Call a transport and decode the payload.
pub async fn request<T: DeserializeOwned>(
    transport: &dyn FolderTransport,
    action: &FolderAction,
) -> AppResult<T> {
    let data = transport.call(action).await?;
    serde_json::from_value(data).map_err(|e| {
        AppError::with_source(
            ErrorKind::Transport,
            format!("Unexpected payload for {}", action.name()),
            e,
        )
    })
}

/// Transport over `POST {base_url}/api/rpc`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url`.
    pub fn new(base_url: &str, token: Option<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Transport, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/rpc", base_url.trim_end_matches('/')),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Endpoint requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FolderTransport for HttpTransport {
    async fn call(&self, action: &FolderAction) -> AppResult<Value> {
        let mut req = self.client.post(&self.endpoint).json(action);
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = req.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("Request '{}' failed: {e}", action.name()),
                e,
            )
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            AppError::with_source(ErrorKind::Transport, "Failed to read response body", e)
        })?;
        debug!(action = action.name(), status = status.as_u16(), bytes = body.len(), "RPC reply");

        decode_envelope(status.as_u16(), &body)
    }
}

/// Decode a reply body. Bodies that are not an envelope become transport
/// errors carrying the HTTP status.
pub fn decode_envelope(status: u16, body: &[u8]) -> AppResult<Value> {
    match serde_json::from_slice::<ActionResponse>(body) {
        Ok(envelope) => envelope.into_result(),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Transport,
            format!("Unexpected response (HTTP {status})"),
            e,
        )),
    }
}
