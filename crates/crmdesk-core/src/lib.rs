//! # crmdesk-core: Table and Invoice Logic for the CRM Dashboard
//!
//! Pure logic behind the dashboard tables and the invoice dialog. No I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        crmdesk Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard Pages                              │   │
//! │  │   Leads ─ Deals ─ Invoices ─ Tasks ─ Reminders ─ Schedules      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              crmdesk-client (stores, backends, config)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ crmdesk-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐       │   │
//! │  │   │  record  │  │  filter  │  │ pipeline │  │  state   │       │   │
//! │  │   │FieldValue│  │ Operator │  │ filter → │  │TableState│       │   │
//! │  │   │ Tabular  │  │Conditions│  │ sort →   │  │Selection │       │   │
//! │  │   └──────────┘  └──────────┘  │ paginate │  └──────────┘       │   │
//! │  │                               └──────────┘                      │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐                      │   │
//! │  │   │  entity  │  │   gst    │  │ summary  │                      │   │
//! │  │   │ Lead ... │  │InvoiceForm│ │ counts   │                      │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘                      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • DETERMINISTIC                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`record`] - Field values and the [`Tabular`] row trait
//! - [`filter`] - Operators, conditions, free-text search
//! - [`pipeline`] - Filter, sort and paginate stages
//! - [`state`] - Per-table UI state
//! - [`entity`] - Lead, Deal, Invoice, Task, Reminder, Schedule
//! - [`gst`] - GST invoice calculator
//! - [`summary`] - Status counts
//! - [`error`] / [`validation`] - Typed errors and input checks
//!
//! ## Example Usage
//!
//! ```rust
//! use crmdesk_core::{PipelineOrder, Record, TableState};
//!
//! let rows = vec![
//!     Record::new().with("id", "1").with("name", "Acme"),
//!     Record::new().with("id", "2").with("name", "Globex"),
//! ];
//!
//! let mut state = TableState::new(10);
//! state.set_query("glob");
//! let view = state.view(&rows, PipelineOrder::FilterSortPaginate);
//! assert_eq!(view.rows.len(), 1);
//! assert_eq!(view.info.total_rows, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod entity;
pub mod error;
pub mod filter;
pub mod gst;
pub mod pipeline;
pub mod record;
pub mod state;
pub mod summary;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use entity::{Column, Deal, Entity, EntityKind, Invoice, Lead, Reminder, Schedule, Task};
pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::{Conditions, FilterCondition, Operator};
pub use gst::{calculate_gst, GstBreakdown, GstInput, InvoiceForm};
pub use pipeline::{
    visible_page, PageInfo, PageWindow, PipelineOrder, SortDescriptor, SortDirection,
};
pub use record::{FieldValue, Record, Tabular};
pub use state::{Selection, TableState, TableView};
pub use summary::{status_counts, StatusCount};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size for a fresh table.
pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// Largest accepted page size.
pub const MAX_ROWS_PER_PAGE: usize = 500;
