//! In-memory document engine for tests and ephemeral use.
//!
//! [`InMemoryCollection`] keeps documents in insertion order in a `Vec`
//! behind a `RwLock`. [`InMemoryDatabase`] hands out one collection per name,
//! creating it on first use. Data is lost when the database is dropped.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use courier_types::EntityId;
use serde_json::Value;
use tracing::trace;

use crate::context::OpContext;
use crate::document::{Document, Filter, UpdateSpec, ID_FIELD};
use crate::error::{StoreError, StoreResult};
use crate::traits::{Collection, Database, UpdateOutcome};

/// An in-memory implementation of [`Collection`].
#[derive(Debug)]
pub struct InMemoryCollection {
    name: String,
    docs: RwLock<Vec<Document>>,
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored documents, matching or not.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<Document>>> {
        self.docs
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<Document>>> {
        self.docs
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    /// The `_id` check, the guard check and the push all happen under one
    /// write lock.
    fn insert_guarded(&self, doc: Document, guard: Option<&Filter>) -> StoreResult<Value> {
        let (id, doc) = match doc.get(ID_FIELD) {
            Some(id) if !id.is_null() => (id.clone(), doc),
            _ => {
                let id = Value::String(EntityId::generate().to_hex());
                let mut with_id = Document::new();
                with_id.insert(ID_FIELD.to_string(), id.clone());
                with_id.extend(doc.into_iter().filter(|(k, _)| k != ID_FIELD));
                (id, with_id)
            }
        };

        let mut docs = self.write()?;
        if docs.iter().any(|d| d.get(ID_FIELD) == Some(&id)) {
            return Err(StoreError::DuplicateKey {
                collection: self.name.clone(),
                id: id_label(&id),
            });
        }
        if let Some(guard) = guard {
            if docs.iter().any(|d| guard.matches(d)) {
                return Err(StoreError::DuplicateKey {
                    collection: self.name.clone(),
                    id: guard.to_string(),
                });
            }
        }
        docs.push(doc);
        trace!(collection = %self.name, id = %id_label(&id), "document inserted");
        Ok(id)
    }
}

fn id_label(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Collection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, doc: Document, ctx: &OpContext) -> StoreResult<Value> {
        ctx.check()?;
        self.insert_guarded(doc, None)
    }

    async fn insert_unless(&self, doc: Document, guard: &Filter, ctx: &OpContext) -> StoreResult<Value> {
        ctx.check()?;
        self.insert_guarded(doc, Some(guard).filter(|g| !g.is_empty()))
    }

    async fn find(&self, filter: &Filter, ctx: &OpContext) -> StoreResult<Vec<Document>> {
        ctx.check()?;
        let docs = self.read()?;
        Ok(docs.iter().filter(|d| filter.matches(d)).cloned().collect())
    }

    async fn find_one(&self, filter: &Filter, ctx: &OpContext) -> StoreResult<Option<Document>> {
        ctx.check()?;
        let docs = self.read()?;
        Ok(docs.iter().find(|d| filter.matches(d)).cloned())
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &UpdateSpec,
        ctx: &OpContext,
    ) -> StoreResult<UpdateOutcome> {
        ctx.check()?;
        let mut docs = self.write()?;
        let Some(doc) = docs.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(UpdateOutcome::default());
        };
        let before = doc.clone();
        update.apply(doc);
        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(*doc != before),
        })
    }

    async fn delete_one(&self, filter: &Filter, ctx: &OpContext) -> StoreResult<u64> {
        ctx.check()?;
        let mut docs = self.write()?;
        match docs.iter().position(|d| filter.matches(d)) {
            Some(pos) => {
                docs.remove(pos);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count_documents(&self, filter: &Filter, ctx: &OpContext) -> StoreResult<u64> {
        ctx.check()?;
        let docs = self.read()?;
        Ok(docs.iter().filter(|d| filter.matches(d)).count() as u64)
    }
}

/// An in-memory implementation of [`Database`].
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    collections: RwLock<HashMap<String, Arc<InMemoryCollection>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// The concrete collection handle, created on first use.
    pub fn memory_collection(&self, name: &str) -> Arc<InMemoryCollection> {
        if let Some(existing) = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(existing);
        }
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(InMemoryCollection::new(name))),
        )
    }

    /// Names of the collections created so far, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl Database for InMemoryDatabase {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        self.memory_collection(name)
    }
}
