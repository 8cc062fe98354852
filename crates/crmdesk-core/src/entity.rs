//! # CRM Entities
//!
//! Typed rows for the six dashboard tables, each with an explicit column
//! accessor table.
//!
//! ## Entity Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Dashboard Entities                              │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐                  │
//! │  │    Lead      │  │    Deal      │  │   Invoice    │                  │
//! │  │  name        │  │  title       │  │  amount      │                  │
//! │  │  email       │  │  value       │  │  discount %  │ ──► gst.rs       │
//! │  │  status      │  │  stage       │  │  gst rate %  │                  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘                  │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐                  │
//! │  │    Task      │  │  Reminder    │  │  Schedule    │                  │
//! │  │  subject     │  │  title       │  │  title       │                  │
//! │  │  priority    │  │  remind_on   │  │  starts_on   │                  │
//! │  │  due_date    │  │  status      │  │  ends_on     │                  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘                  │
//! │                                                                         │
//! │  Every entity: id (row key) + status + COLUMNS accessor table           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Accessor Tables
//! Column lookups go through `&'static [Column<T>]` (key, label, getter)
//! instead of reflective field access, so every filterable/sortable column
//! is known at compile time.
//!
//! ## Wire Leniency
//! Backends are loose about types: ids may be numbers, amounts may arrive as
//! strings, text fields as `null` or numbers, dates as full ISO timestamps.
//! Deserialization accepts all of those; only `id` is required.

use std::fmt;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::record::{FieldValue, Tabular};

// =============================================================================
// Entity Kind
// =============================================================================

/// Which dashboard table an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lead,
    Deal,
    Invoice,
    Task,
    Reminder,
    Schedule,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Lead,
        EntityKind::Deal,
        EntityKind::Invoice,
        EntityKind::Task,
        EntityKind::Reminder,
        EntityKind::Schedule,
    ];

    /// REST collection path segment (`/leads`, `/deals`, ...).
    pub fn resource(&self) -> &'static str {
        match self {
            EntityKind::Lead => "leads",
            EntityKind::Deal => "deals",
            EntityKind::Invoice => "invoices",
            EntityKind::Task => "tasks",
            EntityKind::Reminder => "reminders",
            EntityKind::Schedule => "schedules",
        }
    }

    /// Singular lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Lead => "lead",
            EntityKind::Deal => "deal",
            EntityKind::Invoice => "invoice",
            EntityKind::Task => "task",
            EntityKind::Reminder => "reminder",
            EntityKind::Schedule => "schedule",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.name() == lowered || k.resource() == lowered)
            .ok_or_else(|| CoreError::UnknownEntityKind(s.to_string()))
    }
}

// =============================================================================
// Column Accessors
// =============================================================================

/// One table column: key, header label, typed getter.
pub struct Column<T> {
    pub key: &'static str,
    pub label: &'static str,
    pub get: fn(&T) -> FieldValue,
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .finish()
    }
}

/// A typed dashboard row.
pub trait Entity: Tabular + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Record id used for update/delete requests.
    fn id(&self) -> &str;

    /// Accessor table, in default display order.
    fn columns() -> &'static [Column<Self>];

    /// Looks up a column by key.
    fn column(key: &str) -> Option<&'static Column<Self>> {
        Self::columns().iter().find(|c| c.key == key)
    }

    /// Column keys in display order.
    fn column_keys() -> Vec<&'static str> {
        Self::columns().iter().map(|c| c.key).collect()
    }

    /// Errors unless `key` is a column of this entity.
    fn require_column(key: &str) -> CoreResult<()> {
        match Self::column(key) {
            Some(_) => Ok(()),
            None => Err(CoreError::unknown_column(Self::KIND.name(), key)),
        }
    }
}

macro_rules! tabular_entity {
    ($ty:ty) => {
        impl Tabular for $ty {
            fn row_id(&self) -> String {
                self.id.clone()
            }

            fn field(&self, key: &str) -> FieldValue {
                if key == "id" {
                    return text(&self.id);
                }
                <$ty as Entity>::column(key)
                    .map(|c| (c.get)(self))
                    .unwrap_or_default()
            }

            /// The id followed by every column value.
            fn search_values(&self) -> Vec<FieldValue> {
                std::iter::once(text(&self.id))
                    .chain(<$ty as Entity>::columns().iter().map(|c| (c.get)(self)))
                    .collect()
            }
        }
    };
}

fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.to_string())
}

fn opt_text(s: &Option<String>) -> FieldValue {
    FieldValue::from_option(s.clone())
}

fn opt_date(d: &Option<NaiveDate>) -> FieldValue {
    FieldValue::from_option(*d)
}

// =============================================================================
// Lead
// =============================================================================

/// A sales lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<NaiveDate>,
}

static LEAD_COLUMNS: [Column<Lead>; 7] = [
    Column { key: "name", label: "Name", get: |l| text(&l.name) },
    Column { key: "email", label: "Email", get: |l| text(&l.email) },
    Column { key: "phone", label: "Phone", get: |l| opt_text(&l.phone) },
    Column { key: "company", label: "Company", get: |l| opt_text(&l.company) },
    Column { key: "source", label: "Source", get: |l| opt_text(&l.source) },
    Column { key: "status", label: "Status", get: |l| text(&l.status) },
    Column { key: "createdAt", label: "Created", get: |l| opt_date(&l.created_at) },
];

impl Entity for Lead {
    const KIND: EntityKind = EntityKind::Lead;

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> &'static [Column<Self>] {
        &LEAD_COLUMNS
    }
}

tabular_entity!(Lead);

// =============================================================================
// Deal
// =============================================================================

/// A deal in the sales pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    #[serde(alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub lead_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub stage: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(as = "Option<String>")]
    pub expected_close: Option<NaiveDate>,
}

static DEAL_COLUMNS: [Column<Deal>; 6] = [
    Column { key: "title", label: "Title", get: |d| text(&d.title) },
    Column { key: "leadName", label: "Lead", get: |d| opt_text(&d.lead_name) },
    Column { key: "value", label: "Value", get: |d| FieldValue::Number(d.value) },
    Column { key: "stage", label: "Stage", get: |d| text(&d.stage) },
    Column { key: "status", label: "Status", get: |d| text(&d.status) },
    Column { key: "expectedClose", label: "Expected Close", get: |d| opt_date(&d.expected_close) },
];

impl Entity for Deal {
    const KIND: EntityKind = EntityKind::Deal;

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> &'static [Column<Self>] {
        &DEAL_COLUMNS
    }
}

tabular_entity!(Deal);

// =============================================================================
// Invoice
// =============================================================================

/// An invoice. Totals are kept in sync by [`crate::gst::InvoiceForm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub invoice_number: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub discount_pct: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub gst_rate_pct: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub paid_amount: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_with_gst: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub remaining_amount: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(as = "Option<String>")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
}

static INVOICE_COLUMNS: [Column<Invoice>; 11] = [
    Column { key: "invoiceNumber", label: "Invoice #", get: |i| text(&i.invoice_number) },
    Column { key: "customerName", label: "Customer", get: |i| text(&i.customer_name) },
    Column { key: "amount", label: "Amount", get: |i| FieldValue::Number(i.amount) },
    Column { key: "discountPct", label: "Discount %", get: |i| FieldValue::Number(i.discount_pct) },
    Column { key: "gstRatePct", label: "GST %", get: |i| FieldValue::Number(i.gst_rate_pct) },
    Column { key: "paidAmount", label: "Paid", get: |i| FieldValue::Number(i.paid_amount) },
    Column { key: "totalWithGst", label: "Total", get: |i| FieldValue::Number(i.total_with_gst) },
    Column { key: "remainingAmount", label: "Remaining", get: |i| FieldValue::Number(i.remaining_amount) },
    Column { key: "status", label: "Status", get: |i| text(&i.status) },
    Column { key: "issueDate", label: "Issued", get: |i| opt_date(&i.issue_date) },
    Column { key: "dueDate", label: "Due", get: |i| opt_date(&i.due_date) },
];

impl Entity for Invoice {
    const KIND: EntityKind = EntityKind::Invoice;

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> &'static [Column<Self>] {
        &INVOICE_COLUMNS
    }
}

tabular_entity!(Invoice);

// =============================================================================
// Task
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub priority: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
}

static TASK_COLUMNS: [Column<Task>; 5] = [
    Column { key: "subject", label: "Subject", get: |t| text(&t.subject) },
    Column { key: "assignedTo", label: "Assigned To", get: |t| opt_text(&t.assigned_to) },
    Column { key: "priority", label: "Priority", get: |t| text(&t.priority) },
    Column { key: "status", label: "Status", get: |t| text(&t.status) },
    Column { key: "dueDate", label: "Due", get: |t| opt_date(&t.due_date) },
];

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> &'static [Column<Self>] {
        &TASK_COLUMNS
    }
}

tabular_entity!(Task);

// =============================================================================
// Reminder
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(as = "Option<String>")]
    pub remind_on: Option<NaiveDate>,
}

static REMINDER_COLUMNS: [Column<Reminder>; 4] = [
    Column { key: "title", label: "Title", get: |r| text(&r.title) },
    Column { key: "notes", label: "Notes", get: |r| opt_text(&r.notes) },
    Column { key: "status", label: "Status", get: |r| text(&r.status) },
    Column { key: "remindOn", label: "Remind On", get: |r| opt_date(&r.remind_on) },
];

impl Entity for Reminder {
    const KIND: EntityKind = EntityKind::Reminder;

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> &'static [Column<Self>] {
        &REMINDER_COLUMNS
    }
}

tabular_entity!(Reminder);

// =============================================================================
// Schedule
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(as = "Option<String>")]
    pub starts_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    #[ts(as = "Option<String>")]
    pub ends_on: Option<NaiveDate>,
}

static SCHEDULE_COLUMNS: [Column<Schedule>; 5] = [
    Column { key: "title", label: "Title", get: |s| text(&s.title) },
    Column { key: "location", label: "Location", get: |s| opt_text(&s.location) },
    Column { key: "status", label: "Status", get: |s| text(&s.status) },
    Column { key: "startsOn", label: "Starts", get: |s| opt_date(&s.starts_on) },
    Column { key: "endsOn", label: "Ends", get: |s| opt_date(&s.ends_on) },
];

impl Entity for Schedule {
    const KIND: EntityKind = EntityKind::Schedule;

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> &'static [Column<Self>] {
        &SCHEDULE_COLUMNS
    }
}

tabular_entity!(Schedule);

// =============================================================================
// Lenient Deserializers
// =============================================================================

mod lenient {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// String or number id.
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) if !s.trim().is_empty() => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!("invalid id: {other}"))),
        }
    }

    /// Any scalar as text; null becomes `""`.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(opt_text(deserializer)?.unwrap_or_default())
    }

    /// Any scalar as text; null stays `None`.
    pub fn opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(D::Error::custom(format!("not a text value: {other}"))),
        }
    }

    /// Number, numeric string, or null (→ 0).
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(0.0),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom(format!("number out of range: {n}"))),
            Value::String(s) if s.trim().is_empty() => Ok(0.0),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("not a number: {s:?}"))),
            other => Err(D::Error::custom(format!("not a number: {other}"))),
        }
    }

    /// `YYYY-MM-DD`, any ISO timestamp starting with a date, empty, or null.
    pub fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => {
                let prefix = s.trim().get(..10).unwrap_or(s.trim());
                NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("not a date: {s:?}")))
            }
            other => Err(D::Error::custom(format!("not a date: {other}"))),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
