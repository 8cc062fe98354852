//! # Entity Repository
//!
//! Typed CRUD for one entity over a [`RecordBackend`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EntityStore<Invoice>                                                   │
//! │       │                                                                 │
//! │       │  repo.list() / repo.update(&invoice)                            │
//! │       ▼                                                                 │
//! │  EntityRepository<Invoice, B>                                           │
//! │  ├── list()          → normalize_list::<Invoice>                        │
//! │  ├── create(&draft)  → MutationReply                                    │
//! │  ├── update(&record) → MutationReply   (id must be non-empty)           │
//! │  └── delete(id)      → MutationReply   (id must be non-empty)           │
//! │       │                                                                 │
//! │       │  raw JSON                                                       │
//! │       ▼                                                                 │
//! │  RecordBackend (REST adapter, MemoryBackend, ...)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use crmdesk_core::validation::validate_record_id;
use crmdesk_core::Entity;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::RecordBackend;
use crate::error::ClientResult;
use crate::response::{normalize_list, MutationReply};

/// Repository for one entity type.
///
/// ## Usage
/// ```rust,ignore
/// let repo = EntityRepository::<Lead, _>::new(backend.clone());
///
/// let leads = repo.list().await?;
/// repo.delete(&leads[0].id).await?;
/// ```
pub struct EntityRepository<T, B: ?Sized> {
    backend: Arc<B>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, B: ?Sized> Clone for EntityRepository<T, B> {
    fn clone(&self) -> Self {
        EntityRepository {
            backend: Arc::clone(&self.backend),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity, B: RecordBackend + ?Sized> EntityRepository<T, B> {
    pub fn new(backend: Arc<B>) -> Self {
        EntityRepository {
            backend,
            _entity: PhantomData,
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Fetches every record of this entity.
    pub async fn list(&self) -> ClientResult<Vec<T>> {
        let kind = T::KIND;
        debug!(%kind, backend = self.backend.backend_tag(), "Listing records");

        let body = self.backend.list(kind).await?;
        let records = normalize_list::<T>(body)?;

        debug!(%kind, count = records.len(), "Listed records");
        Ok(records)
    }

    /// Creates a record from a draft. An empty `id` in the draft is dropped
    /// so the backend assigns one.
    pub async fn create<D: Serialize + ?Sized>(&self, draft: &D) -> ClientResult<MutationReply> {
        let kind = T::KIND;
        let mut body = serde_json::to_value(draft)?;
        if let Value::Object(map) = &mut body {
            if map.get("id").and_then(Value::as_str).is_some_and(|id| id.trim().is_empty()) {
                map.remove("id");
            }
        }

        let reply = self.finish("create", self.backend.create(kind, body).await)?;
        info!(%kind, "Record created");
        Ok(reply)
    }

    /// Replaces a record's fields on the backend.
    pub async fn update(&self, record: &T) -> ClientResult<MutationReply> {
        let kind = T::KIND;
        let id = record.id();
        validate_record_id(id)?;

        let body = serde_json::to_value(record)?;
        let reply = self.finish("update", self.backend.update(kind, id, body).await)?;
        info!(%kind, %id, "Record updated");
        Ok(reply)
    }

    /// Deletes a record by id.
    pub async fn delete(&self, id: &str) -> ClientResult<MutationReply> {
        let kind = T::KIND;
        validate_record_id(id)?;

        let reply = self.finish("delete", self.backend.delete(kind, id).await)?;
        info!(%kind, %id, "Record deleted");
        Ok(reply)
    }

    fn finish(&self, action: &str, body: ClientResult<Value>) -> ClientResult<MutationReply> {
        let kind = T::KIND;
        let result = body.and_then(MutationReply::parse);
        if let Err(e) = &result {
            warn!(%kind, action, error = %e, "Mutation failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::memory::{Failure, ListShape, MemoryBackend, Operation};
    use crmdesk_core::{CoreError, EntityKind, Invoice, InvoiceForm, ValidationError};
    use serde_json::json;

    fn invoice_backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new(ListShape::Bare).with_rows(
            EntityKind::Invoice,
            vec![json!({
                "id": "inv-1",
                "invoiceNumber": "INV-0001",
                "customerName": "Acme Traders",
                "amount": 1000,
                "status": "unpaid"
            })],
        ))
    }

    #[tokio::test]
    async fn test_list_decodes_entities() {
        let repo = EntityRepository::<Invoice, _>::new(invoice_backend());
        let invoices = repo.list().await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].invoice_number, "INV-0001");
    }

    #[tokio::test]
    async fn test_update_writes_gst_totals() {
        let backend = invoice_backend();
        let repo = EntityRepository::<Invoice, _>::new(backend.clone());
        let mut invoice = repo.list().await.unwrap().remove(0);

        let mut form = InvoiceForm::from_invoice(&invoice);
        form.set_discount_pct(10.0);
        form.set_gst_rate_pct(18.0);
        form.set_paid_amount(500.0);
        form.apply_to(&mut invoice);

        let reply = repo.update(&invoice).await.unwrap();
        assert_eq!(reply.message_or(""), "Invoice updated");

        let reloaded = repo.list().await.unwrap().remove(0);
        assert_eq!(reloaded.total_with_gst, 1062.0);
        assert_eq!(reloaded.remaining_amount, 562.0);
    }

    #[tokio::test]
    async fn test_create_drops_blank_id() {
        let backend = invoice_backend();
        let repo = EntityRepository::<Invoice, _>::new(backend.clone());
        repo.create(&json!({"id": "", "invoiceNumber": "INV-0002"}))
            .await
            .unwrap();

        let invoices = repo.list().await.unwrap();
        assert_eq!(invoices.len(), 2);
        assert!(!invoices[1].id.is_empty());
    }

    #[tokio::test]
    async fn test_empty_id_rejected_before_request() {
        let repo = EntityRepository::<Invoice, _>::new(invoice_backend());
        let err = repo.delete("  ").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[tokio::test]
    async fn test_backend_rejection() {
        let backend = invoice_backend();
        backend
            .fail_next(Operation::Delete, Failure::Reject("Invoice is paid".into()))
            .await;
        let repo = EntityRepository::<Invoice, _>::new(backend.clone());

        let err = repo.delete("inv-1").await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected(ref msg) if msg == "Invoice is paid"));
        assert_eq!(backend.count(EntityKind::Invoice).await, 1);
    }
}
