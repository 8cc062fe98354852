//! # In-Memory Backend
//!
//! A [`RecordBackend`] holding every table in process memory. Serves the demo
//! binary and the store tests.
//!
//! Behaves like the REST API: ids are assigned on create, updates merge the
//! given fields, unknown ids are `NotFound`. The list shape (wrapped or
//! bare) is selectable, and failures can be queued per operation.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use crmdesk_core::EntityKind;
use serde_json::{json, Map, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::backend::RecordBackend;
use crate::error::{ClientError, ClientResult};

/// Shape of list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListShape {
    /// `{ "data": [...] }`
    #[default]
    Wrapped,
    /// `[...]`
    Bare,
}

/// Backend operation, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

/// Injected failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// Transport failure (`RequestFailed`).
    Unreachable(String),
    /// Reply with `{ "error": ... }`.
    Reject(String),
    /// Reply with this body verbatim.
    Body(Value),
}

pub struct MemoryBackend {
    tables: RwLock<HashMap<EntityKind, Vec<Map<String, Value>>>>,
    failures: Mutex<HashMap<Operation, VecDeque<Failure>>>,
    shape: ListShape,
    list_calls: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        MemoryBackend::new(ListShape::default())
    }
}

impl MemoryBackend {
    pub fn new(shape: ListShape) -> Self {
        MemoryBackend {
            tables: RwLock::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            shape,
            list_calls: AtomicU64::new(0),
        }
    }

    /// Seeds a table before the backend is shared. Non-object rows are dropped.
    pub fn with_rows(mut self, kind: EntityKind, rows: Vec<Value>) -> Self {
        let table = self.tables.get_mut().entry(kind).or_default();
        table.extend(rows.into_iter().filter_map(|row| match row {
            Value::Object(map) => Some(map),
            _ => None,
        }));
        self
    }

    /// Queues a failure for the next call of `op`.
    pub async fn fail_next(&self, op: Operation, failure: Failure) {
        self.failures
            .lock()
            .await
            .entry(op)
            .or_default()
            .push_back(failure);
    }

    /// Number of rows currently stored for `kind`.
    pub async fn count(&self, kind: EntityKind) -> usize {
        self.tables.read().await.get(&kind).map_or(0, Vec::len)
    }

    /// Number of list calls served so far.
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::Relaxed)
    }

    async fn injected(&self, op: Operation) -> ClientResult<Option<Value>> {
        let failure = self
            .failures
            .lock()
            .await
            .get_mut(&op)
            .and_then(VecDeque::pop_front);

        match failure {
            None => Ok(None),
            Some(Failure::Unreachable(message)) => Err(ClientError::RequestFailed(message)),
            Some(Failure::Reject(message)) => Ok(Some(json!({ "error": message }))),
            Some(Failure::Body(body)) => Ok(Some(body)),
        }
    }
}

fn row_id(row: &Map<String, Value>) -> Option<String> {
    match row.get("id").or_else(|| row.get("_id"))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn into_object(kind: EntityKind, body: Value) -> ClientResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ClientError::SerializationFailed(format!(
            "{} body must be a JSON object",
            kind
        ))),
    }
}

fn capitalized(kind: EntityKind) -> String {
    let name = kind.name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, kind: EntityKind) -> ClientResult<Value> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(body) = self.injected(Operation::List).await? {
            return Ok(body);
        }

        let rows: Vec<Value> = self
            .tables
            .read()
            .await
            .get(&kind)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default();

        debug!(%kind, count = rows.len(), "Memory backend list");
        Ok(match self.shape {
            ListShape::Wrapped => json!({ "data": rows }),
            ListShape::Bare => Value::Array(rows),
        })
    }

    async fn create(&self, kind: EntityKind, body: Value) -> ClientResult<Value> {
        if let Some(body) = self.injected(Operation::Create).await? {
            return Ok(body);
        }

        let mut row = into_object(kind, body)?;
        row.remove("_id");
        let id = match row_id(&row) {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        row.insert("id".to_string(), Value::String(id.clone()));

        self.tables.write().await.entry(kind).or_default().push(row);

        debug!(%kind, %id, "Memory backend create");
        Ok(json!({ "message": format!("{} created", capitalized(kind)), "id": id }))
    }

    async fn update(&self, kind: EntityKind, id: &str, body: Value) -> ClientResult<Value> {
        if let Some(body) = self.injected(Operation::Update).await? {
            return Ok(body);
        }

        let patch = into_object(kind, body)?;
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r).as_deref() == Some(id)))
            .ok_or_else(|| ClientError::not_found(kind.name(), id))?;

        for (key, value) in patch {
            if key != "id" && key != "_id" {
                row.insert(key, value);
            }
        }

        debug!(%kind, %id, "Memory backend update");
        Ok(json!({ "message": format!("{} updated", capitalized(kind)) }))
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> ClientResult<Value> {
        if let Some(body) = self.injected(Operation::Delete).await? {
            return Ok(body);
        }

        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(&kind)
            .ok_or_else(|| ClientError::not_found(kind.name(), id))?;
        let before = rows.len();
        rows.retain(|r| row_id(r).as_deref() != Some(id));
        if rows.len() == before {
            return Err(ClientError::not_found(kind.name(), id));
        }

        debug!(%kind, %id, "Memory backend delete");
        Ok(json!({ "message": format!("{} deleted", capitalized(kind)) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(shape: ListShape) -> MemoryBackend {
        MemoryBackend::new(shape).with_rows(
            EntityKind::Task,
            vec![
                json!({"id": "t1", "subject": "Call Acme", "status": "open"}),
                json!({"id": 2, "subject": "Send quote", "status": "done"}),
            ],
        )
    }

    #[tokio::test]
    async fn test_list_shapes() {
        let wrapped = seeded(ListShape::Wrapped).list(EntityKind::Task).await.unwrap();
        assert_eq!(wrapped["data"].as_array().map(Vec::len), Some(2));

        let bare = seeded(ListShape::Bare).list(EntityKind::Task).await.unwrap();
        assert_eq!(bare.as_array().map(Vec::len), Some(2));

        let empty = seeded(ListShape::Bare).list(EntityKind::Deal).await.unwrap();
        assert_eq!(empty, json!([]));
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let backend = MemoryBackend::default();
        let reply = backend
            .create(EntityKind::Lead, json!({"name": "Kavya", "id": ""}))
            .await
            .unwrap();
        assert_eq!(reply["message"], "Lead created");
        assert!(!reply["id"].as_str().unwrap_or_default().is_empty());
        assert_eq!(backend.count(EntityKind::Lead).await, 1);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let backend = seeded(ListShape::Bare);
        backend
            .update(EntityKind::Task, "2", json!({"status": "open", "id": "hijack"}))
            .await
            .unwrap();
        let rows = backend.list(EntityKind::Task).await.unwrap();
        assert_eq!(rows[1]["status"], "open");
        assert_eq!(rows[1]["subject"], "Send quote");
        assert_eq!(rows[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let backend = seeded(ListShape::Bare);
        assert!(matches!(
            backend.update(EntityKind::Task, "nope", json!({})).await,
            Err(ClientError::NotFound { .. })
        ));
        assert!(matches!(
            backend.delete(EntityKind::Task, "nope").await,
            Err(ClientError::NotFound { .. })
        ));
        backend.delete(EntityKind::Task, "t1").await.unwrap();
        assert_eq!(backend.count(EntityKind::Task).await, 1);
    }

    #[tokio::test]
    async fn test_injected_failures_are_one_shot() {
        let backend = seeded(ListShape::Wrapped);
        backend
            .fail_next(Operation::List, Failure::Unreachable("timeout".into()))
            .await;
        backend
            .fail_next(Operation::Delete, Failure::Reject("Task is locked".into()))
            .await;

        assert!(matches!(
            backend.list(EntityKind::Task).await,
            Err(ClientError::RequestFailed(_))
        ));
        assert!(backend.list(EntityKind::Task).await.is_ok());
        assert_eq!(backend.list_calls(), 2);

        let reply = backend.delete(EntityKind::Task, "t1").await.unwrap();
        assert_eq!(reply["error"], "Task is locked");
        assert_eq!(backend.count(EntityKind::Task).await, 2);
    }
}
