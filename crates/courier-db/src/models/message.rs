use courier_store::{Filter, ID_FIELD};
use courier_types::id::{self, EntityId};
use courier_types::Message;
use serde::{Deserialize, Serialize};

use super::{id_value, is_false, merge, non_empty, Timestamps};
use crate::adapter::ModelAdapter;
use crate::error::{DbError, DbResult};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(rename = "_id", default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl ModelAdapter for MessageRecord {
    type Entity = Message;
    const COLLECTION: &'static str = "messages";

    fn from_domain(msg: &Message) -> DbResult<Self> {
        Ok(Self {
            id: msg.id,
            conversation_id: msg.conversation_id,
            sender_id: msg.sender_id,
            receiver_id: msg.receiver_id,
            content: non_empty(&msg.content),
            content_type: non_empty(&msg.content_type),
            group: msg.group,
            file_ids: non_empty(&msg.file_ids),
            timestamps: Timestamps::new(msg.created_at, msg.updated_at, msg.deleted_at),
        })
    }

    fn to_domain(&self) -> Message {
        Message {
            id: self.id,
            conversation_id: self.conversation_id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content.clone(),
            content_type: self.content_type.clone(),
            group: self.group,
            file_ids: self.file_ids.clone(),
            created_at: self.timestamps.created_at,
            updated_at: self.timestamps.updated_at,
            deleted_at: self.timestamps.deleted_at,
        }
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn apply_partial_update(&mut self, incoming: &Self) {
        merge(&mut self.conversation_id, &incoming.conversation_id);
        merge(&mut self.sender_id, &incoming.sender_id);
        merge(&mut self.receiver_id, &incoming.receiver_id);
        merge(&mut self.content, &incoming.content);
        merge(&mut self.content_type, &incoming.content_type);
        merge(&mut self.file_ids, &incoming.file_ids);
        if incoming.group {
            self.group = true;
        }
        self.timestamps.merge(&incoming.timestamps);
    }

    fn derive_filter(&self) -> Filter {
        if let Some(id) = self.id {
            Filter::new().with(ID_FIELD, id_value(id))
        } else if let Some(receiver) = self.receiver_id {
            Filter::new().with("receiver_id", id_value(receiver))
        } else if let Some(sender) = self.sender_id {
            Filter::new().with("sender_id", id_value(sender))
        } else if let Some(conversation) = self.conversation_id {
            Filter::new().with("conversation_id", id_value(conversation))
        } else {
            Filter::new()
        }
    }

    /// Many messages share a receiver or sender; only the id is unique.
    fn collision_filter(&self) -> Filter {
        match self.id {
            Some(id) => Filter::new().with(ID_FIELD, id_value(id)),
            None => Filter::new(),
        }
    }

    fn post_validate(&self) -> DbResult<()> {
        if self.sender_id.is_none() {
            return Err(DbError::Serialization(
                "stored message has no sender id".into(),
            ));
        }
        Ok(())
    }
}
