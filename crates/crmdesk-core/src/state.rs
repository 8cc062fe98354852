//! # Table State
//!
//! One state container per entity table: search text, conditions, sort,
//! page window, selection and visible columns.
//!
//! ## State Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Table State Operations                               │
//! │                                                                         │
//! │  UI Event                 Method                  Page afterwards       │
//! │  ────────                 ──────                  ───────────────       │
//! │                                                                         │
//! │  Type in search ────────► set_query() ──────────► 1                     │
//! │  Apply condition ───────► apply_condition() ────► 1                     │
//! │  Click column header ───► sort_by() ────────────► unchanged             │
//! │  Change page size ──────► set_rows_per_page() ──► 1                     │
//! │  Next / Previous ───────► next_page() ──────────► +1 / -1 (if allowed)  │
//! │  Tick row checkbox ─────► select() ─────────────► unchanged             │
//! │                                                                         │
//! │  NOTE: the page value is never clamped to the page count; navigation    │
//! │        is refused at the bounds instead.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::filter::{Conditions, FilterCondition};
use crate::pipeline::{
    arrange, filter_records, PageInfo, PageWindow, PipelineOrder, SortDescriptor, SortDirection,
};
use crate::record::Tabular;
use crate::validation::validate_rows_per_page;
use crate::DEFAULT_ROWS_PER_PAGE;

// =============================================================================
// Selection
// =============================================================================

/// Which rows are ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode", content = "keys")]
pub enum Selection {
    #[default]
    None,
    All,
    Keys(BTreeSet<String>),
}

impl Selection {
    pub fn contains(&self, key: &str) -> bool {
        match self {
            Selection::None => false,
            Selection::All => true,
            Selection::Keys(keys) => keys.contains(key),
        }
    }
}

// =============================================================================
// Table View
// =============================================================================

/// Rows to render plus the pagination footer.
#[derive(Debug)]
pub struct TableView<'a, T> {
    pub rows: Vec<&'a T>,
    pub info: PageInfo,
}

// =============================================================================
// Table State
// =============================================================================

/// Interactive state for one entity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    query: String,
    conditions: Conditions,
    sort: SortDescriptor,
    page: usize,
    rows_per_page: usize,
    selection: Selection,
    visible_columns: Vec<String>,
}

impl Default for TableState {
    fn default() -> Self {
        TableState::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl TableState {
    /// Creates a state on page 1. A zero page size falls back to the default.
    pub fn new(rows_per_page: usize) -> Self {
        TableState {
            query: String::new(),
            conditions: Conditions::new(),
            sort: SortDescriptor::none(),
            page: 1,
            rows_per_page: if rows_per_page == 0 {
                DEFAULT_ROWS_PER_PAGE
            } else {
                rows_per_page
            },
            selection: Selection::None,
            visible_columns: Vec::new(),
        }
    }

    /// Creates a state showing the given columns.
    pub fn with_columns<I, S>(rows_per_page: usize, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = TableState::new(rows_per_page);
        state.visible_columns = columns.into_iter().map(Into::into).collect();
        state
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    pub fn sort(&self) -> &SortDescriptor {
        &self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn visible_columns(&self) -> &[String] {
        &self.visible_columns
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.rows_per_page)
    }

    // =========================================================================
    // Search & Conditions
    // =========================================================================

    /// Sets the free-text query and returns to page 1.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    /// Adds or replaces the condition for the condition's field and returns to page 1.
    pub fn apply_condition(&mut self, condition: FilterCondition) {
        self.conditions.apply(condition);
        self.page = 1;
    }

    pub fn remove_condition(&mut self, field: &str) -> Option<FilterCondition> {
        let removed = self.conditions.remove(field);
        if removed.is_some() {
            self.page = 1;
        }
        removed
    }

    pub fn clear_conditions(&mut self) {
        self.conditions.clear();
        self.page = 1;
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Header click: a new column sorts ascending, the active column flips.
    pub fn sort_by(&mut self, column: &str) {
        let direction = match self.sort.active() {
            Some((active, direction)) if active == column => direction.toggled(),
            _ => SortDirection::Ascending,
        };
        self.sort = SortDescriptor::by(column, direction);
    }

    pub fn set_sort(&mut self, sort: SortDescriptor) {
        self.sort = sort;
    }

    pub fn clear_sort(&mut self) {
        self.sort = SortDescriptor::none();
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Jumps to a page. The value is kept as given.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Advances one page if `page_count` allows it. Returns whether it moved.
    pub fn next_page(&mut self, page_count: usize) -> bool {
        if self.page < page_count {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Goes back one page unless already on page 1. Returns whether it moved.
    pub fn previous_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Changes the page size and returns to page 1.
    ///
    /// ## Example
    /// ```rust
    /// use crmdesk_core::state::TableState;
    ///
    /// let mut state = TableState::new(5);
    /// state.set_page(3);
    /// state.set_rows_per_page(10).unwrap();
    /// assert_eq!(state.page(), 1);
    /// assert!(state.set_rows_per_page(0).is_err());
    /// ```
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<(), ValidationError> {
        validate_rows_per_page(rows_per_page)?;
        self.rows_per_page = rows_per_page;
        self.page = 1;
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select(&mut self, key: impl Into<String>) {
        let key = key.into();
        match &mut self.selection {
            Selection::All => {}
            Selection::Keys(keys) => {
                keys.insert(key);
            }
            Selection::None => {
                self.selection = Selection::Keys(BTreeSet::from([key]));
            }
        }
    }

    /// Unticks one row. Deselecting from "all" is resolved against `all_keys`.
    pub fn deselect<I, S>(&mut self, key: &str, all_keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys = match std::mem::take(&mut self.selection) {
            Selection::None => BTreeSet::new(),
            Selection::All => all_keys.into_iter().map(Into::into).collect(),
            Selection::Keys(keys) => keys,
        };
        keys.remove(key);
        if !keys.is_empty() {
            self.selection = Selection::Keys(keys);
        }
    }

    pub fn select_all(&mut self) {
        self.selection = Selection::All;
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.contains(key)
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Shows or hides a column.
    pub fn toggle_column(&mut self, column: &str) {
        if let Some(pos) = self.visible_columns.iter().position(|c| c == column) {
            self.visible_columns.remove(pos);
        } else {
            self.visible_columns.push(column.to_string());
        }
    }

    // =========================================================================
    // Derived View
    // =========================================================================

    /// Runs the pipeline over `records` with the current inputs.
    pub fn view<'a, T: Tabular>(&self, records: &'a [T], order: PipelineOrder) -> TableView<'a, T> {
        let filtered = filter_records(records, &self.query, &self.conditions);
        let info = PageInfo::new(self.window(), filtered.len());
        let rows = arrange(filtered, &self.sort, self.window(), order);
        TableView { rows, info }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Operator;
    use crate::record::Record;

    fn tasks(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::new()
                    .with("id", i.to_string())
                    .with("subject", format!("Call customer {i}"))
                    .with("status", if i % 2 == 0 { "done" } else { "pending" })
            })
            .collect()
    }

    #[test]
    fn test_rows_per_page_change_resets_page() {
        let mut state = TableState::new(5);
        state.set_page(3);
        assert_eq!(state.page(), 3);

        state.set_rows_per_page(10).unwrap();
        assert_eq!(state.page(), 1);
        assert_eq!(state.rows_per_page(), 10);
    }

    #[test]
    fn test_zero_rows_per_page_rejected() {
        let mut state = TableState::new(5);
        state.set_page(2);
        assert!(state.set_rows_per_page(0).is_err());
        assert_eq!(state.rows_per_page(), 5);
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn test_query_and_condition_reset_page() {
        let mut state = TableState::new(5);
        state.set_page(4);
        state.set_query("call");
        assert_eq!(state.page(), 1);

        state.set_page(2);
        state.apply_condition(FilterCondition::new("status", Operator::Is, "done"));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_navigation_is_guarded() {
        let mut state = TableState::new(5);
        assert!(!state.previous_page());
        assert!(state.next_page(2));
        assert!(!state.next_page(2));
        assert_eq!(state.page(), 2);
        assert!(state.previous_page());
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_page_is_not_clamped() {
        let records = tasks(7);
        let mut state = TableState::new(5);
        state.set_page(9);
        let view = state.view(&records, PipelineOrder::default());
        assert!(view.rows.is_empty());
        assert_eq!(view.info.page, 9);
        assert_eq!(view.info.page_count, 2);
        assert!(!view.info.has_next);
    }

    #[test]
    fn test_sort_by_toggles() {
        let mut state = TableState::default();
        state.sort_by("subject");
        assert_eq!(state.sort().active(), Some(("subject", SortDirection::Ascending)));
        state.sort_by("subject");
        assert_eq!(state.sort().active(), Some(("subject", SortDirection::Descending)));
        state.sort_by("status");
        assert_eq!(state.sort().active(), Some(("status", SortDirection::Ascending)));
        state.clear_sort();
        assert_eq!(state.sort().active(), None);
    }

    #[test]
    fn test_view_counts_filtered_rows() {
        let records = tasks(12);
        let mut state = TableState::new(4);
        state.apply_condition(FilterCondition::new("status", Operator::Is, "done"));

        let view = state.view(&records, PipelineOrder::default());
        assert_eq!(view.info.total_rows, 6);
        assert_eq!(view.info.page_count, 2);
        assert_eq!(view.rows.len(), 4);
        assert!(view.rows.iter().all(|r| r.field("status").to_search_text() == "done"));
    }

    #[test]
    fn test_selection() {
        let mut state = TableState::default();
        assert!(!state.is_selected("1"));

        state.select("1");
        state.select("2");
        assert!(state.is_selected("2"));

        state.deselect("1", Vec::<String>::new());
        assert!(!state.is_selected("1"));
        assert!(state.is_selected("2"));

        state.select_all();
        state.deselect("3", ["1", "2", "3"]);
        assert_eq!(
            state.selection(),
            &Selection::Keys(BTreeSet::from(["1".to_string(), "2".to_string()]))
        );

        state.deselect("1", Vec::<String>::new());
        state.deselect("2", Vec::<String>::new());
        assert_eq!(state.selection(), &Selection::None);
    }

    #[test]
    fn test_toggle_column() {
        let mut state = TableState::with_columns(5, ["name", "status"]);
        state.toggle_column("status");
        assert_eq!(state.visible_columns(), ["name"]);
        state.toggle_column("email");
        assert_eq!(state.visible_columns(), ["name", "email"]);
    }
}
