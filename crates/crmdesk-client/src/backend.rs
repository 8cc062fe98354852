//! # Record Backend
//!
//! The contract between the dashboard and whatever serves the records.
//!
//! ## REST Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Method                     HTTP                      Body back         │
//! │  ──────                     ────                      ─────────         │
//! │  list(kind)                 GET    /{resource}        list shape        │
//! │  create(kind, body)         POST   /{resource}        message / error   │
//! │  update(kind, id, body)     PUT    /{resource}/{id}   message / error   │
//! │  delete(kind, id)           DELETE /{resource}/{id}   message / error   │
//! │                                                                         │
//! │  {resource} = EntityKind::resource() (leads, deals, invoices, ...)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations return raw JSON; [`crate::response`] makes sense of it.
//! Transport failures map to [`ClientError::RequestFailed`], a 404 to
//! [`ClientError::NotFound`].
//!
//! [`ClientError::RequestFailed`]: crate::error::ClientError::RequestFailed
//! [`ClientError::NotFound`]: crate::error::ClientError::NotFound

use async_trait::async_trait;
use crmdesk_core::EntityKind;
use serde_json::Value;

use crate::error::ClientResult;

#[async_trait]
pub trait RecordBackend: Send + Sync + 'static {
    /// Short name for log fields.
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn list(&self, kind: EntityKind) -> ClientResult<Value>;
    async fn create(&self, kind: EntityKind, body: Value) -> ClientResult<Value>;
    async fn update(&self, kind: EntityKind, id: &str, body: Value) -> ClientResult<Value>;
    async fn delete(&self, kind: EntityKind, id: &str) -> ClientResult<Value>;
}

