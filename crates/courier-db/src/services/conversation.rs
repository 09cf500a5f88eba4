use courier_store::Database;
use courier_types::{Conversation, EntityId, Validate, ValidationCase};

use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};
use crate::models::ConversationRecord;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct ConversationService {
    store: DocumentStore<ConversationRecord>,
}

impl ConversationService {
    pub fn new(db: &dyn Database, config: StoreConfig) -> Self {
        Self {
            store: DocumentStore::new(db, config),
        }
    }

    pub async fn create(&self, convo: &Conversation) -> DbResult<Conversation> {
        convo.validate(ValidationCase::Create)?;
        self.store.insert_one(convo).await
    }

    pub async fn find(&self, convo: &Conversation) -> DbResult<Conversation> {
        self.store.find_one(convo).await
    }

    pub async fn find_all(&self, convo: &Conversation) -> DbResult<Vec<Conversation>> {
        self.store.find_many(convo).await
    }

    /// Conversations that list `participant`.
    pub async fn find_for_participant(&self, participant: EntityId) -> DbResult<Vec<Conversation>> {
        let all = self.store.find_many(&Conversation::default()).await?;
        Ok(all
            .into_iter()
            .filter(|c| c.has_participant(&participant))
            .collect())
    }

    pub async fn update(&self, convo: &Conversation) -> DbResult<Conversation> {
        convo.validate(ValidationCase::Update)?;
        let id = convo.id.ok_or_else(|| {
            DbError::Validation("missing the following conversation fields: id".into())
        })?;
        self.store.update_one(&Conversation::with_id(id), convo).await
    }

    pub async fn delete(&self, convo: &Conversation) -> DbResult<Conversation> {
        self.store.delete_one(convo).await
    }

    pub async fn doc_insert(&self, convo: &Conversation) -> DbResult<Conversation> {
        self.store.insert_raw(convo).await
    }
}
