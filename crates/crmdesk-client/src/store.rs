//! # Entity Store
//!
//! Everything one dashboard table needs: the fetched records, the table
//! state, the open dialog and pending notices.
//!
//! ## Fetch / Mutate Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  page opens ──► begin_fetch() ──► ticket #1                             │
//! │  filter change ► begin_fetch() ──► ticket #2   (#1 is now stale)        │
//! │                                                                         │
//! │  response #2 ──► apply_fetch(#2, Ok(rows)) ──► records = rows           │
//! │  response #1 ──► apply_fetch(#1, ...)      ──► ignored                  │
//! │                                                                         │
//! │  fetch error ──► records = [] + error notice                            │
//! │                                                                         │
//! │  submit_create / submit_update / submit_delete                          │
//! │     ├── ok   ──► dialog closed, success notice, full re-fetch           │
//! │     └── err  ──► dialog kept open, error notice                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The last *issued* fetch wins: a slow early response can no longer
//! overwrite a newer one.

use crmdesk_core::{
    status_counts, CoreResult, Entity, FilterCondition, PipelineOrder, SortDirection,
    StatusCount, TableState, TableView,
};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::backend::RecordBackend;
use crate::error::ClientResult;
use crate::repository::EntityRepository;

// =============================================================================
// Notices & Dialogs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the toast area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Which modal is open.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog<T> {
    Closed,
    Create,
    Edit(T),
    ConfirmDelete(String),
}

impl<T> Dialog<T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Dialog::Closed)
    }
}

/// Sequence number of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

// =============================================================================
// Entity Store
// =============================================================================

pub struct EntityStore<T: Entity> {
    records: Vec<T>,
    table: TableState,
    dialog: Dialog<T>,
    notices: Vec<Notice>,
    issued: u64,
    loading: bool,
}

impl<T: Entity> EntityStore<T> {
    /// Store whose table shows every column of `T`.
    pub fn new(rows_per_page: usize) -> Self {
        EntityStore::with_table(TableState::with_columns(rows_per_page, T::column_keys()))
    }

    pub fn with_table(table: TableState) -> Self {
        EntityStore {
            records: Vec::new(),
            table,
            dialog: Dialog::Closed,
            notices: Vec::new(),
            issued: 0,
            loading: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    /// Direct access for search, paging and selection events.
    pub fn table_mut(&mut self) -> &mut TableState {
        &mut self.table
    }

    pub fn dialog(&self) -> &Dialog<T> {
        &self.dialog
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hands pending notices to the toast area.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // =========================================================================
    // Column-checked Table Events
    // =========================================================================

    /// Header click; rejects columns `T` does not have.
    pub fn sort_by(&mut self, column: &str) -> CoreResult<Option<SortDirection>> {
        T::require_column(column)?;
        self.table.sort_by(column);
        Ok(self.table.sort().active().map(|(_, direction)| direction))
    }

    /// Applies a condition; rejects fields `T` does not have.
    pub fn apply_condition(&mut self, condition: FilterCondition) -> CoreResult<()> {
        T::require_column(&condition.field)?;
        self.table.apply_condition(condition);
        Ok(())
    }

    // =========================================================================
    // Dialogs
    // =========================================================================

    pub fn open_create(&mut self) {
        self.dialog = Dialog::Create;
    }

    pub fn open_edit(&mut self, record: T) {
        self.dialog = Dialog::Edit(record);
    }

    pub fn open_delete(&mut self, id: impl Into<String>) {
        self.dialog = Dialog::ConfirmDelete(id.into());
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::Closed;
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Issues a new ticket; any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket(self.issued)
    }

    /// Applies a list result if `ticket` is the latest issued.
    ///
    /// Returns false when the result was stale and dropped.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: ClientResult<Vec<T>>) -> bool {
        let kind = T::KIND;
        if ticket.0 != self.issued {
            debug!(%kind, ticket = ticket.0, latest = self.issued, "Dropping stale fetch result");
            return false;
        }

        self.loading = false;
        match result {
            Ok(records) => {
                debug!(%kind, count = records.len(), "Fetched records");
                self.records = records;
            }
            Err(e) => {
                error!(%kind, error = %e, "Fetch failed");
                self.records.clear();
                self.notices
                    .push(Notice::error(format!("Failed to load {}s: {}", kind, e)));
            }
        }
        true
    }

    /// Fetches the full record set through `repo`.
    pub async fn refresh<B: RecordBackend + ?Sized>(&mut self, repo: &EntityRepository<T, B>) -> bool {
        let ticket = self.begin_fetch();
        let result = repo.list().await;
        self.apply_fetch(ticket, result)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a record. Returns true on success.
    pub async fn submit_create<B, D>(&mut self, repo: &EntityRepository<T, B>, draft: &D) -> bool
    where
        B: RecordBackend + ?Sized,
        D: Serialize + ?Sized,
    {
        let result = repo.create(draft).await;
        let fallback = format!("{} created", T::KIND);
        self.settle(repo, result.map(|r| r.message_or(&fallback))).await
    }

    /// Saves an edited record. Returns true on success.
    pub async fn submit_update<B: RecordBackend + ?Sized>(
        &mut self,
        repo: &EntityRepository<T, B>,
        record: &T,
    ) -> bool {
        let result = repo.update(record).await;
        let fallback = format!("{} updated", T::KIND);
        self.settle(repo, result.map(|r| r.message_or(&fallback))).await
    }

    /// Deletes a record. Returns true on success.
    pub async fn submit_delete<B: RecordBackend + ?Sized>(
        &mut self,
        repo: &EntityRepository<T, B>,
        id: &str,
    ) -> bool {
        let result = repo.delete(id).await;
        let fallback = format!("{} deleted", T::KIND);
        self.settle(repo, result.map(|r| r.message_or(&fallback))).await
    }

    async fn settle<B: RecordBackend + ?Sized>(
        &mut self,
        repo: &EntityRepository<T, B>,
        outcome: ClientResult<String>,
    ) -> bool {
        match outcome {
            Ok(message) => {
                let kind = T::KIND;
                info!(%kind, %message, "Mutation succeeded");
                self.dialog = Dialog::Closed;
                self.notices.push(Notice::success(message));
                self.refresh(repo).await;
                true
            }
            Err(e) => {
                self.notices.push(Notice::error(e.to_string()));
                false
            }
        }
    }

    // =========================================================================
    // Derived Data
    // =========================================================================

    /// Current visible page.
    pub fn view(&self, order: PipelineOrder) -> TableView<'_, T> {
        self.table.view(&self.records, order)
    }

    /// Status breakdown over all fetched records.
    pub fn status_counts(&self) -> Vec<StatusCount> {
        status_counts(&self.records, "status")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::ClientError;
    use crate::memory::{Failure, ListShape, MemoryBackend, Operation};
    use crmdesk_core::{CoreError, EntityKind, Lead, Operator};
    use serde_json::json;

    fn lead(id: &str, name: &str, status: &str) -> Lead {
        serde_json::from_value(json!({"id": id, "name": name, "status": status})).unwrap()
    }

    fn lead_backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new(ListShape::Wrapped).with_rows(
            EntityKind::Lead,
            vec![
                json!({"id": "1", "name": "Acme", "status": "New"}),
                json!({"id": "2", "name": "Globex", "status": "Contacted"}),
                json!({"id": "3", "name": "Initech", "status": "New"}),
            ],
        ))
    }

    #[test]
    fn test_stale_fetch_is_ignored() {
        let mut store = EntityStore::<Lead>::new(10);
        let first = store.begin_fetch();
        let second = store.begin_fetch();

        assert!(store.apply_fetch(second, Ok(vec![lead("2", "Newer", "New")])));
        assert!(!store.apply_fetch(first, Ok(vec![lead("1", "Older", "New")])));

        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].name, "Newer");
        assert!(!store.is_loading());
    }

    #[test]
    fn test_fetch_failure_empties_records() {
        let mut store = EntityStore::<Lead>::new(10);
        let ticket = store.begin_fetch();
        store.apply_fetch(ticket, Ok(vec![lead("1", "Acme", "New")]));

        let ticket = store.begin_fetch();
        store.apply_fetch(ticket, Err(ClientError::RequestFailed("offline".into())));

        assert!(store.records().is_empty());
        let notices = store.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(store.notices().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_and_view() {
        let repo = EntityRepository::<Lead, _>::new(lead_backend());
        let mut store = EntityStore::<Lead>::new(2);
        assert!(store.refresh(&repo).await);

        let view = store.view(PipelineOrder::FilterSortPaginate);
        assert_eq!(view.info.total_rows, 3);
        assert_eq!(view.info.page_count, 2);
        assert_eq!(view.rows.len(), 2);

        store
            .apply_condition(FilterCondition::new("status", Operator::Is, "new"))
            .unwrap();
        let view = store.view(PipelineOrder::FilterSortPaginate);
        let names: Vec<&str> = view.rows.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Acme", "Initech"]);
    }

    #[tokio::test]
    async fn test_successful_create_closes_dialog_and_refetches() {
        let backend = lead_backend();
        let repo = EntityRepository::<Lead, _>::new(backend.clone());
        let mut store = EntityStore::<Lead>::new(10);
        store.refresh(&repo).await;

        store.open_create();
        let created = store
            .submit_create(&repo, &json!({"name": "Umbrella", "status": "New"}))
            .await;

        assert!(created);
        assert!(!store.dialog().is_open());
        assert_eq!(store.records().len(), 4);
        assert_eq!(backend.list_calls(), 2);
        assert_eq!(store.notices()[0], Notice::success("Lead created"));
    }

    #[tokio::test]
    async fn test_failed_update_keeps_dialog_open() {
        let backend = lead_backend();
        backend
            .fail_next(Operation::Update, Failure::Unreachable("connection reset".into()))
            .await;
        let repo = EntityRepository::<Lead, _>::new(backend.clone());
        let mut store = EntityStore::<Lead>::new(10);
        store.refresh(&repo).await;

        let mut edited = store.records()[0].clone();
        edited.status = "Qualified".to_string();
        store.open_edit(edited.clone());

        assert!(!store.submit_update(&repo, &edited).await);
        assert_eq!(store.dialog(), &Dialog::Edit(edited.clone()));
        assert_eq!(store.notices()[0].level, NoticeLevel::Error);
        assert_eq!(backend.list_calls(), 1);

        // retry succeeds
        assert!(store.submit_update(&repo, &edited).await);
        assert_eq!(store.records()[0].status, "Qualified");
        assert!(!store.dialog().is_open());
    }

    #[tokio::test]
    async fn test_delete_rejected_by_backend() {
        let backend = lead_backend();
        backend
            .fail_next(Operation::Delete, Failure::Reject("Lead has open deals".into()))
            .await;
        let repo = EntityRepository::<Lead, _>::new(backend.clone());
        let mut store = EntityStore::<Lead>::new(10);
        store.refresh(&repo).await;

        store.open_delete("2");
        assert!(!store.submit_delete(&repo, "2").await);
        assert!(store.dialog().is_open());
        assert_eq!(store.notices()[0], Notice::error("Lead has open deals"));

        assert!(store.submit_delete(&repo, "2").await);
        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_list_normalizes_to_empty() {
        let backend = lead_backend();
        backend
            .fail_next(Operation::List, Failure::Body(json!({"rows": []})))
            .await;
        let repo = EntityRepository::<Lead, _>::new(backend);
        let mut store = EntityStore::<Lead>::new(10);

        assert!(store.refresh(&repo).await);
        assert!(store.records().is_empty());
        assert_eq!(store.notices()[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_unknown_columns_rejected() {
        let mut store = EntityStore::<Lead>::new(10);
        assert!(matches!(
            store.sort_by("colour"),
            Err(CoreError::UnknownColumn { .. })
        ));
        assert_eq!(store.sort_by("name").unwrap(), Some(SortDirection::Ascending));
        assert!(store
            .apply_condition(FilterCondition::unary("budget", Operator::IsEmpty))
            .is_err());
    }

    #[test]
    fn test_status_counts() {
        let mut store = EntityStore::<Lead>::new(10);
        let ticket = store.begin_fetch();
        store.apply_fetch(
            ticket,
            Ok(vec![
                lead("1", "Acme", "New"),
                lead("2", "Globex", "Won"),
                lead("3", "Initech", "New"),
            ]),
        );
        let counts = store.status_counts();
        assert_eq!(counts[0], StatusCount { status: "New".into(), count: 2 });
    }
}
