//! # crmdesk-client: Backend Contract and Entity Stores
//!
//! Connects the pure table logic in `crmdesk-core` to a record backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        crmdesk Data Flow                                │
//! │                                                                         │
//! │  Dashboard page (Leads, Deals, Invoices, ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  crmdesk-client (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │  EntityStore  │    │  Repository   │    │   Backend    │   │   │
//! │  │   │  (store.rs)   │───►│(repository.rs)│───►│ (backend.rs) │   │   │
//! │  │   │ tickets,      │    │ typed CRUD,   │    │ raw JSON     │   │   │
//! │  │   │ dialogs,      │    │ normalization │    │ HttpBackend  │   │   │
//! │  │   │ notices       │    │               │    │ MemoryBackend│   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   config.rs: crmdesk.toml + CRMDESK_* overrides                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  REST API  (GET/POST /{resource}, PUT/DELETE /{resource}/{id})          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - The `RecordBackend` trait
//! - [`http`] - REST backend over `reqwest`
//! - [`memory`] - In-process backend for tests and the demo
//! - [`response`] - List and mutation response normalization
//! - [`repository`] - Typed CRUD per entity
//! - [`store`] - Per-table state, fetch sequencing, dialogs, notices
//! - [`config`] - Client configuration
//! - [`error`] - Client error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crmdesk_client::{EntityRepository, EntityStore, MemoryBackend};
//! use crmdesk_core::{Lead, PipelineOrder};
//!
//! let repo = EntityRepository::<Lead, _>::new(Arc::new(MemoryBackend::default()));
//! let mut leads = EntityStore::<Lead>::new(10);
//!
//! leads.refresh(&repo).await;
//! leads.table_mut().set_query("acme");
//! let page = leads.view(PipelineOrder::FilterSortPaginate);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod repository;
pub mod response;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::RecordBackend;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use repository::EntityRepository;
pub use response::{normalize_list, MutationReply};
pub use store::{Dialog, EntityStore, FetchTicket, Notice, NoticeLevel};

// =============================================================================
// Logging
// =============================================================================

/// Installs the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=crmdesk_client=trace` - Trace this crate only
/// - Default: `info,crmdesk=debug`
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,crmdesk=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
