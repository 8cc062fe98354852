//! Status breakdowns for the dashboard summary cards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::record::Tabular;

/// Label used for rows whose status field is missing or blank.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Number of rows sharing one status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Counts rows by the value of `field`.
///
/// Ordered by descending count, ties broken by status name.
///
/// ```rust
/// use crmdesk_core::record::Record;
/// use crmdesk_core::summary::status_counts;
///
/// let rows = vec![
///     Record::new().with("status", "open"),
///     Record::new().with("status", "won"),
///     Record::new().with("status", "open"),
/// ];
/// let counts = status_counts(&rows, "status");
/// assert_eq!(counts[0].status, "open");
/// assert_eq!(counts[0].count, 2);
/// ```
pub fn status_counts<T: Tabular>(records: &[T], field: &str) -> Vec<StatusCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in records {
        let text = row.field(field).to_search_text();
        let status = if text.trim().is_empty() {
            UNKNOWN_STATUS.to_string()
        } else {
            text
        };
        *counts.entry(status).or_default() += 1;
    }

    let mut out: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    #[test]
    fn test_counts_and_order() {
        let rows = vec![
            Record::new().with("status", "won"),
            Record::new().with("status", "open"),
            Record::new().with("status", "lost"),
            Record::new().with("status", "open"),
            Record::new().with("status", "won"),
            Record::new().with("status", "open"),
        ];
        let counts = status_counts(&rows, "status");
        assert_eq!(
            counts,
            vec![
                StatusCount { status: "open".into(), count: 3 },
                StatusCount { status: "won".into(), count: 2 },
                StatusCount { status: "lost".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_missing_and_blank_are_unknown() {
        let rows = vec![
            Record::new(),
            Record::new().with("status", "  "),
            Record::new().with("status", "paid"),
        ];
        let counts = status_counts(&rows, "status");
        assert_eq!(counts[0], StatusCount { status: UNKNOWN_STATUS.into(), count: 2 });
        assert_eq!(counts[1], StatusCount { status: "paid".into(), count: 1 });
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<Record> = Vec::new();
        assert!(status_counts(&rows, "status").is_empty());
    }
}
