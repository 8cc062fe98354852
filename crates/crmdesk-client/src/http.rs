//! # HTTP Backend
//!
//! [`RecordBackend`] over the dashboard's REST API.
//!
//! ## Status Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  2xx, empty body          ──► null (MutationReply::default)             │
//! │  2xx, JSON body           ──► body                                      │
//! │  2xx, not JSON            ──► MalformedResponse                         │
//! │  404 on /{resource}/{id}  ──► NotFound                                  │
//! │  4xx/5xx with error/msg   ──► Rejected(msg)                             │
//! │  4xx/5xx otherwise        ──► RequestFailed("HTTP 503 ...")             │
//! │  connect / timeout        ──► RequestFailed                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No retries and no auth headers; the store surfaces failures as notices.

use std::time::Duration;

use async_trait::async_trait;
use crmdesk_core::EntityKind;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::backend::RecordBackend;
use crate::config::{BackendSettings, ClientConfig};
use crate::error::{ClientError, ClientResult};

pub struct HttpBackend {
    client: reqwest::Client,
    settings: BackendSettings,
}

impl HttpBackend {
    /// Builds a client with the configured request timeout.
    pub fn new(settings: BackendSettings) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("http client: {e}")))?;

        Ok(HttpBackend { client, settings })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        HttpBackend::new(config.backend.clone())
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    async fn send(
        &self,
        kind: EntityKind,
        id: Option<&str>,
        request: RequestBuilder,
    ) -> ClientResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::RequestFailed(format!("read body failed: {e}")))?;

        debug!(%kind, status = status.as_u16(), len = bytes.len(), "HTTP response");
        interpret(kind, id, status, &bytes)
    }
}

/// Maps a status and raw body to the backend contract.
fn interpret(kind: EntityKind, id: Option<&str>, status: StatusCode, bytes: &[u8]) -> ClientResult<Value> {
    let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Null)
    } else {
        serde_json::from_slice::<Value>(bytes)
    };

    if status.is_success() {
        return parsed.map_err(|e| ClientError::MalformedResponse(format!("{kind} response: {e}")));
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(ClientError::not_found(kind.name(), id));
        }
    }

    let message = parsed.ok().and_then(|body| {
        ["error", "message"]
            .iter()
            .find_map(|key| body.get(key).and_then(Value::as_str).map(str::to_string))
    });

    match message {
        Some(message) if !message.trim().is_empty() => Err(ClientError::Rejected(message)),
        _ => Err(ClientError::RequestFailed(format!("HTTP {status}"))),
    }
}

#[async_trait]
impl RecordBackend for HttpBackend {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self))]
    async fn list(&self, kind: EntityKind) -> ClientResult<Value> {
        let url = self.settings.collection_url(kind.resource());
        self.send(kind, None, self.client.get(url)).await
    }

    #[instrument(skip(self, body))]
    async fn create(&self, kind: EntityKind, body: Value) -> ClientResult<Value> {
        let url = self.settings.collection_url(kind.resource());
        self.send(kind, None, self.client.post(url).json(&body)).await
    }

    #[instrument(skip(self, body))]
    async fn update(&self, kind: EntityKind, id: &str, body: Value) -> ClientResult<Value> {
        let url = self.settings.item_url(kind.resource(), id);
        self.send(kind, Some(id), self.client.put(url).json(&body)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, kind: EntityKind, id: &str) -> ClientResult<Value> {
        let url = self.settings.item_url(kind.resource(), id);
        self.send(kind, Some(id), self.client.delete(url)).await
    }
}
