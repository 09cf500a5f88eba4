//! The capability contract every storage record implements.

use courier_store::{Document, Filter, UpdateSpec, ID_FIELD};
use courier_types::{EntityId, Validate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DbError, DbResult};
use crate::models::Timestamps;

/// Conversion, matching and filter building for one storage record type.
///
/// A record is the storage shape of a domain entity: the same fields, with
/// `_id` as the primary key and absent values omitted from the document.
/// [`DocumentStore`](crate::DocumentStore) is generic over this trait and
/// never looks inside a record except through it.
pub trait ModelAdapter:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The domain type callers work with.
    type Entity: Validate + Clone + Send + Sync + 'static;

    /// Name of the backing collection.
    const COLLECTION: &'static str;

    /// Map a domain entity to its record. An absent id stays absent.
    fn from_domain(entity: &Self::Entity) -> DbResult<Self>;

    /// Map a record back to the domain. Total.
    fn to_domain(&self) -> Self::Entity;

    fn id(&self) -> Option<EntityId>;

    fn set_id(&mut self, id: EntityId);

    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    /// Copy the populated fields of `incoming` onto `self`.
    ///
    /// Absent fields never reset stored values. The id is never copied.
    fn apply_partial_update(&mut self, incoming: &Self);

    /// Filter from the populated identifying fields, in priority order.
    fn derive_filter(&self) -> Filter;

    /// Filter used to detect a collision before inserting.
    ///
    /// Defaults to [`ModelAdapter::derive_filter`]. Records whose lookup
    /// fields are not unique narrow it.
    fn collision_filter(&self) -> Filter {
        self.derive_filter()
    }

    /// Record-level checks run on every decoded record.
    fn post_validate(&self) -> DbResult<()> {
        Ok(())
    }

    /// Assign a fresh id when none is set and return the id in effect.
    fn ensure_id(&mut self) -> EntityId {
        match self.id() {
            Some(id) => id,
            None => {
                let id = EntityId::generate();
                self.set_id(id);
                id
            }
        }
    }

    fn stamp_timestamps(&mut self, is_new: bool) {
        self.timestamps_mut().stamp(is_new);
    }

    fn is_deleted(&self) -> bool {
        self.timestamps().deleted_at.is_some()
    }

    /// `$set` of every populated field except `_id`.
    fn derive_update(&self) -> DbResult<UpdateSpec> {
        let mut doc = self.to_document()?;
        doc.remove(ID_FIELD);
        Ok(UpdateSpec::set(doc))
    }

    /// In-memory match used by the scan fallback.
    ///
    /// The query is decoded into this record shape; only its populated
    /// discriminating fields are compared, in priority order. A query that
    /// does not decode, or carries no discriminator, matches nothing.
    fn matches(&self, query: &Document) -> bool {
        let Ok(query) = Self::from_document(query.clone()) else {
            return false;
        };
        let filter = query.derive_filter();
        if filter.is_empty() {
            return false;
        }
        self.to_document().is_ok_and(|doc| filter.matches(&doc))
    }

    fn to_document(&self) -> DbResult<Document> {
        match serde_json::to_value(self)? {
            Value::Object(doc) => Ok(doc),
            other => Err(DbError::Serialization(format!(
                "{} record encoded as {other} instead of an object",
                Self::COLLECTION
            ))),
        }
    }

    fn from_document(doc: Document) -> DbResult<Self> {
        Ok(serde_json::from_value(Value::Object(doc))?)
    }
}
