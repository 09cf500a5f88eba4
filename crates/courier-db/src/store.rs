//! Generic CRUD engine parameterized by a [`ModelAdapter`].

use std::marker::PhantomData;
use std::sync::Arc;

use courier_store::{Collection, Database, Document, Filter, OpContext, StoreError, ID_FIELD};
use courier_types::EntityId;
use tracing::{debug, trace};

use crate::adapter::ModelAdapter;
use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};
use crate::models::id_value;

/// Typed access to one collection.
///
/// Documents with `deleted_at` set are invisible to every read and mutation
/// here, but still occupy their id and natural key for `insert_one`.
pub struct DocumentStore<M> {
    collection: Arc<dyn Collection>,
    config: StoreConfig,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for DocumentStore<M> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            config: self.config,
            _model: PhantomData,
        }
    }
}

impl<M: ModelAdapter> DocumentStore<M> {
    /// Open the adapter's collection in `db`.
    pub fn new(db: &dyn Database, config: StoreConfig) -> Self {
        Self::from_collection(db.collection(M::COLLECTION), config)
    }

    pub fn from_collection(collection: Arc<dyn Collection>, config: StoreConfig) -> Self {
        Self {
            collection,
            config,
            _model: PhantomData,
        }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Persist a new entity and return it as stored.
    ///
    /// Assigns an id when absent and stamps `created_at`/`updated_at`. Fails
    /// with [`DbError::Duplicate`] when the entity collides with a stored
    /// document, deleted or not. The collision check and the write are one
    /// driver call, so they are atomic wherever the driver's
    /// [`Collection::insert_unless`] is.
    pub async fn insert_one(&self, entity: &M::Entity) -> DbResult<M::Entity> {
        let mut record = M::from_domain(entity)?;
        let ctx = self.config.context();

        let guard = record.collision_filter();
        if guard.is_empty() {
            trace!(collection = %self.collection_name(), "no collision key; relying on _id uniqueness");
        }

        let id = record.ensure_id();
        record.stamp_timestamps(true);
        let doc = record.to_document()?;
        ctx.run(self.collection.insert_unless(doc, &guard, &ctx))
            .await
            .inspect_err(|e| {
                if matches!(e, StoreError::DuplicateKey { .. }) {
                    debug!(collection = %self.collection_name(), "insert rejected: duplicate");
                }
            })?;
        debug!(collection = %self.collection_name(), %id, "inserted");
        Ok(record.to_domain())
    }

    /// The first live document selected by the entity's derived filter.
    pub async fn find_one(&self, entity: &M::Entity) -> DbResult<M::Entity> {
        Ok(self.find_record(entity).await?.to_domain())
    }

    /// Every live document selected by the entity's derived filter, in
    /// storage order. An entity with no identifying field selects all.
    pub async fn find_many(&self, entity: &M::Entity) -> DbResult<Vec<M::Entity>> {
        let filter = M::from_domain(entity)?.derive_filter();
        let ctx = self.config.context();
        let records = self.find_live(&filter, &ctx).await?;
        debug!(collection = %self.collection_name(), count = records.len(), "find_many");
        Ok(records.iter().map(M::to_domain).collect())
    }

    /// Merge the populated fields of `patch` into the document selected by
    /// `filter` and return the result.
    pub async fn update_one(
        &self,
        filter: &M::Entity,
        patch: &M::Entity,
    ) -> DbResult<M::Entity> {
        let existing = self.find_record(filter).await?;
        let id = self.stored_id(&existing)?;
        let incoming = M::from_domain(patch)?;

        let mut updated = existing;
        updated.apply_partial_update(&incoming);
        updated.stamp_timestamps(false);

        let ctx = self.config.context();
        let by_id = Filter::new().with(ID_FIELD, id_value(id));
        let update = updated.derive_update()?;
        let outcome = ctx
            .run(self.collection.update_one(&by_id, &update, &ctx))
            .await?;
        if outcome.matched == 0 {
            return Err(DbError::not_found(self.collection_name()));
        }
        debug!(collection = %self.collection_name(), %id, modified = outcome.modified, "updated");
        Ok(updated.to_domain())
    }

    /// Physically remove the selected document and return it.
    pub async fn delete_one(&self, entity: &M::Entity) -> DbResult<M::Entity> {
        let existing = self.find_record(entity).await?;
        let id = self.stored_id(&existing)?;

        let ctx = self.config.context();
        let by_id = Filter::new().with(ID_FIELD, id_value(id));
        let removed = ctx.run(self.collection.delete_one(&by_id, &ctx)).await?;
        if removed == 0 {
            return Err(DbError::not_found(self.collection_name()));
        }
        debug!(collection = %self.collection_name(), %id, "deleted");
        Ok(existing.to_domain())
    }

    /// Number of live documents selected by the entity's derived filter.
    pub async fn count(&self, entity: &M::Entity) -> DbResult<u64> {
        let filter = M::from_domain(entity)?.derive_filter();
        let ctx = self.config.context();
        Ok(self.find_live(&filter, &ctx).await?.len() as u64)
    }

    /// Persist exactly what is given: no stamping, id assignment or
    /// collision check. The driver may still fill in a missing `_id`.
    pub async fn insert_raw(&self, entity: &M::Entity) -> DbResult<M::Entity> {
        let mut record = M::from_domain(entity)?;
        let ctx = self.config.context();
        let id = ctx
            .run(self.collection.insert_one(record.to_document()?, &ctx))
            .await?;
        if record.id().is_none() {
            if let Some(id) = id.as_str().and_then(|s| EntityId::parse(s).ok().flatten()) {
                record.set_id(id);
            }
        }
        trace!(collection = %self.collection_name(), "raw insert");
        Ok(record.to_domain())
    }

    /// Full scan returning the first live record whose
    /// [`ModelAdapter::matches`] accepts `query`.
    pub async fn scan_for_match(&self, query: &Document, ctx: &OpContext) -> DbResult<Option<M>> {
        let all = self.find_live(&Filter::new(), ctx).await?;
        trace!(collection = %self.collection_name(), scanned = all.len(), "scan fallback");
        Ok(all.into_iter().find(|record| record.matches(query)))
    }

    async fn find_record(&self, entity: &M::Entity) -> DbResult<M> {
        let record = M::from_domain(entity)?;
        let filter = record.derive_filter();
        let ctx = self.config.context();

        let found = if filter.is_empty() {
            self.scan_for_match(&record.to_document()?, &ctx).await?
        } else {
            self.find_live(&filter, &ctx).await?.into_iter().next()
        };
        found.ok_or_else(|| {
            debug!(collection = %self.collection_name(), "no match");
            DbError::not_found(self.collection_name())
        })
    }

    /// Decoded, non-deleted records matching `filter`.
    async fn find_live(&self, filter: &Filter, ctx: &OpContext) -> DbResult<Vec<M>> {
        let docs = ctx.run(self.collection.find(filter, ctx)).await?;
        let mut live = Vec::with_capacity(docs.len());
        for doc in docs {
            let record = M::from_document(doc)?;
            record.post_validate()?;
            if !record.is_deleted() {
                live.push(record);
            }
        }
        Ok(live)
    }

    fn stored_id(&self, record: &M) -> DbResult<EntityId> {
        record.id().ok_or_else(|| {
            DbError::Internal(format!("{} document stored without _id", self.collection_name()))
        })
    }
}
