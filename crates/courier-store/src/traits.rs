use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::OpContext;
use crate::document::{Document, Filter, UpdateSpec};
use crate::error::{StoreError, StoreResult};

/// Result of an `update_one` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents selected by the filter (0 or 1).
    pub matched: u64,
    /// Documents whose stored value changed.
    pub modified: u64,
}

/// A named collection of documents.
///
/// All implementations must satisfy these invariants:
/// - `find` returns matches in storage order.
/// - Every document has a unique `_id`; inserting a second document with a
///   stored `_id` fails with [`StoreError::DuplicateKey`].
/// - Calls observe the [`OpContext`] deadline and fail with
///   [`StoreError::DeadlineExceeded`] once it passes.
///
/// [`StoreError::DuplicateKey`]: crate::StoreError::DuplicateKey
/// [`StoreError::DeadlineExceeded`]: crate::StoreError::DeadlineExceeded
#[async_trait]
pub trait Collection: Send + Sync {
    /// The collection's name.
    fn name(&self) -> &str;

    /// Persist a document and return its `_id`.
    ///
    /// A document without `_id` gets a freshly generated one.
    async fn insert_one(&self, doc: Document, ctx: &OpContext) -> StoreResult<Value>;

    /// Insert `doc` unless a stored document matches `guard`, in which case
    /// fail with [`StoreError::DuplicateKey`]. An empty guard never matches.
    ///
    /// The default implementation counts then inserts, so two concurrent
    /// callers can both pass the check. Backends that can check and insert
    /// under one lock or a unique index should override it.
    ///
    /// [`StoreError::DuplicateKey`]: crate::StoreError::DuplicateKey
    async fn insert_unless(&self, doc: Document, guard: &Filter, ctx: &OpContext) -> StoreResult<Value> {
        if !guard.is_empty() && self.count_documents(guard, ctx).await? > 0 {
            return Err(StoreError::DuplicateKey {
                collection: self.name().to_string(),
                id: guard.to_string(),
            });
        }
        self.insert_one(doc, ctx).await
    }

    /// Every document matching `filter`, in storage order.
    async fn find(&self, filter: &Filter, ctx: &OpContext) -> StoreResult<Vec<Document>>;

    /// The first document matching `filter`.
    ///
    /// Default implementation takes the head of [`Collection::find`].
    async fn find_one(&self, filter: &Filter, ctx: &OpContext) -> StoreResult<Option<Document>> {
        Ok(self.find(filter, ctx).await?.into_iter().next())
    }

    /// Apply `update` to the first document matching `filter`.
    async fn update_one(
        &self,
        filter: &Filter,
        update: &UpdateSpec,
        ctx: &OpContext,
    ) -> StoreResult<UpdateOutcome>;

    /// Remove the first document matching `filter`. Returns the number removed.
    async fn delete_one(&self, filter: &Filter, ctx: &OpContext) -> StoreResult<u64>;

    /// Number of documents matching `filter`.
    async fn count_documents(&self, filter: &Filter, ctx: &OpContext) -> StoreResult<u64> {
        Ok(self.find(filter, ctx).await?.len() as u64)
    }
}

/// A database handing out collections by name.
///
/// Repeated calls with the same name must return handles to the same data.
pub trait Database: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}
