//! # Filter-Sort-Paginate Pipeline
//!
//! Turns a full in-memory record set into the rows of one table page.
//!
//! ## Pipeline Stages
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    visible_page(records, ...)                           │
//! │                                                                         │
//! │  records (never mutated)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. free-text search  ── any field contains query (ignore case)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. conditions        ── every per-field condition holds                │
//! │       │                                                                 │
//! │       ├──── FilterSortPaginate (default) ────┐                          │
//! │       │                                      ▼                          │
//! │       │                        3. sort whole filtered set               │
//! │       │                        4. slice (page-1)*n .. page*n            │
//! │       │                                                                 │
//! │       └──── PaginateThenSort (legacy) ───────┐                          │
//! │                                              ▼                          │
//! │                                3. slice (page-1)*n .. page*n            │
//! │                                4. sort only that slice                  │
//! │                                                                         │
//! │  Output: Vec<&T> borrowed from the input slice                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage is total: empty input, missing fields and mixed value types
//! never panic.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::filter::{matches_query, Conditions};
use crate::record::{FieldValue, Tabular};

// =============================================================================
// Sort Descriptor
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The other direction.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Active sort column and direction. `None` in either slot means "keep input order".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SortDescriptor {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortDescriptor {
    /// Sort by `column` in `direction`.
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        SortDescriptor {
            column: Some(column.into()),
            direction: Some(direction),
        }
    }

    /// No sort.
    pub fn none() -> Self {
        SortDescriptor::default()
    }

    /// Returns the column and direction only when both are set.
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        match (&self.column, self.direction) {
            (Some(column), Some(direction)) => Some((column.as_str(), direction)),
            _ => None,
        }
    }
}

// =============================================================================
// Page Window
// =============================================================================

/// 1-based page plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub page: usize,
    pub rows_per_page: usize,
}

impl PageWindow {
    pub fn new(page: usize, rows_per_page: usize) -> Self {
        PageWindow {
            page,
            rows_per_page,
        }
    }

    /// Index range this window covers within `len` rows.
    ///
    /// Page 0 and pages past the end yield an empty range.
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        if self.page == 0 || self.rows_per_page == 0 {
            return 0..0;
        }
        let start = (self.page - 1).saturating_mul(self.rows_per_page).min(len);
        let end = start.saturating_add(self.rows_per_page).min(len);
        start..end
    }
}

/// Which comes first: sorting or the page slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PipelineOrder {
    /// Sort the whole filtered set, then take the page.
    #[default]
    FilterSortPaginate,
    /// Take the page from the filtered set, then sort within it.
    PaginateThenSort,
}

impl std::str::FromStr for PipelineOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filter_sort_paginate" | "sort_first" => Ok(PipelineOrder::FilterSortPaginate),
            "paginate_then_sort" | "legacy" => Ok(PipelineOrder::PaginateThenSort),
            other => Err(format!(
                "Unknown pipeline order: '{}'. Valid options: filter_sort_paginate, paginate_then_sort",
                other
            )),
        }
    }
}

// =============================================================================
// Page Info
// =============================================================================

/// Pagination summary for the footer controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub rows_per_page: usize,
    pub total_rows: usize,
    pub page_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    pub fn new(window: PageWindow, total_rows: usize) -> Self {
        let page_count = page_count(total_rows, window.rows_per_page);
        PageInfo {
            page: window.page,
            rows_per_page: window.rows_per_page,
            total_rows,
            page_count,
            has_previous: window.page > 1,
            has_next: window.page < page_count,
        }
    }
}

/// `ceil(total_rows / rows_per_page)`; zero when `rows_per_page` is zero.
pub fn page_count(total_rows: usize, rows_per_page: usize) -> usize {
    if rows_per_page == 0 {
        return 0;
    }
    total_rows.div_ceil(rows_per_page)
}

// =============================================================================
// Stages
// =============================================================================

/// Stages 1 and 2: search then conditions. Input order is preserved.
pub fn filter_records<'a, T: Tabular>(
    records: &'a [T],
    query: &str,
    conditions: &Conditions,
) -> Vec<&'a T> {
    records
        .iter()
        .filter(|row| matches_query(*row, query))
        .filter(|row| conditions.matches(*row))
        .collect()
}

/// Stable sort of borrowed rows by the descriptor. No-op when no sort is active.
pub fn sort_records<T: Tabular>(rows: &mut Vec<&T>, sort: &SortDescriptor) {
    let Some((column, direction)) = sort.active() else {
        return;
    };

    let mut keyed: Vec<(FieldValue, &T)> = rows.drain(..).map(|r| (r.field(column), r)).collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ord = a.natural_cmp(b);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    rows.extend(keyed.into_iter().map(|(_, r)| r));
}

/// Stage: take the rows covered by `window`.
pub fn paginate<'a, T>(rows: &[&'a T], window: PageWindow) -> Vec<&'a T> {
    rows[window.range(rows.len())].to_vec()
}

/// Runs the full pipeline and returns the visible page.
///
/// ## Example
/// ```rust
/// use crmdesk_core::filter::Conditions;
/// use crmdesk_core::pipeline::{visible_page, PageWindow, PipelineOrder, SortDescriptor, SortDirection};
/// use crmdesk_core::record::{Record, Tabular};
///
/// let records: Vec<Record> = (1..=7)
///     .map(|n| Record::new().with("id", n.to_string()).with("score", (n * 10) as f64))
///     .collect();
///
/// let page = visible_page(
///     &records,
///     "",
///     &Conditions::new(),
///     &SortDescriptor::by("score", SortDirection::Descending),
///     PageWindow::new(1, 3),
///     PipelineOrder::FilterSortPaginate,
/// );
/// let ids: Vec<String> = page.iter().map(|r| r.row_id()).collect();
/// assert_eq!(ids, ["7", "6", "5"]);
/// ```
pub fn visible_page<'a, T: Tabular>(
    records: &'a [T],
    query: &str,
    conditions: &Conditions,
    sort: &SortDescriptor,
    window: PageWindow,
    order: PipelineOrder,
) -> Vec<&'a T> {
    let filtered = filter_records(records, query, conditions);
    arrange(filtered, sort, window, order)
}

/// Stages 3 and 4 over an already filtered set, in the given order.
pub fn arrange<'a, T: Tabular>(
    mut filtered: Vec<&'a T>,
    sort: &SortDescriptor,
    window: PageWindow,
    order: PipelineOrder,
) -> Vec<&'a T> {
    match order {
        PipelineOrder::FilterSortPaginate => {
            sort_records(&mut filtered, sort);
            paginate(&filtered, window)
        }
        PipelineOrder::PaginateThenSort => {
            let mut page = paginate(&filtered, window);
            sort_records(&mut page, sort);
            page
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
