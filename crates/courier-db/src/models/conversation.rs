use courier_store::{Filter, ID_FIELD};
use courier_types::id::{self, EntityId};
use courier_types::Conversation;
use serde::{Deserialize, Serialize};

use super::{id_value, is_false, Timestamps};
use crate::adapter::ModelAdapter;
use crate::error::DbResult;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(rename = "_id", default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, with = "id::list", skip_serializing_if = "Vec::is_empty")]
    pub participants_ids: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub group: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl ModelAdapter for ConversationRecord {
    type Entity = Conversation;
    const COLLECTION: &'static str = "conversations";

    fn from_domain(convo: &Conversation) -> DbResult<Self> {
        Ok(Self {
            id: convo.id,
            participants_ids: convo.participants_ids.clone(),
            group: convo.group,
            timestamps: Timestamps::new(convo.created_at, convo.updated_at, convo.deleted_at),
        })
    }

    fn to_domain(&self) -> Conversation {
        Conversation {
            id: self.id,
            participants_ids: self.participants_ids.clone(),
            group: self.group,
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
        if !incoming.participants_ids.is_empty() {
            self.participants_ids = incoming.participants_ids.clone();
        }
        if incoming.group {
            self.group = true;
        }
        self.timestamps.merge(&incoming.timestamps);
    }

    fn derive_filter(&self) -> Filter {
        match self.id {
            Some(id) => Filter::new().with(ID_FIELD, id_value(id)),
            None => Filter::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participants_round_trip_through_the_document() {
        let (a, b) = (EntityId::generate(), EntityId::generate());
        let record = ConversationRecord::from_domain(&Conversation::between([a, b])).unwrap();
        let doc = record.to_document().unwrap();
        assert_eq!(doc["participants_ids"][1], b.to_hex());
        let back = ConversationRecord::from_document(doc).unwrap();
        assert_eq!(back.to_domain().participants_ids, vec![a, b]);
        assert!(back.derive_filter().is_empty());
    }
}
