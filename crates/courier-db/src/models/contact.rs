use courier_store::{Filter, ID_FIELD};
use courier_types::id::{self, EntityId};
use courier_types::{Contact, ContactStatus};
use serde::{Deserialize, Serialize};

use super::{id_value, merge, Timestamps};
use crate::adapter::ModelAdapter;
use crate::error::DbResult;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(rename = "_id", default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl ModelAdapter for ContactRecord {
    type Entity = Contact;
    const COLLECTION: &'static str = "contacts";

    fn from_domain(contact: &Contact) -> DbResult<Self> {
        Ok(Self {
            id: contact.id,
            requester_id: contact.requester_id,
            recipient_id: contact.recipient_id,
            status: contact.status,
            timestamps: Timestamps::new(contact.created_at, contact.updated_at, contact.deleted_at),
        })
    }

    fn to_domain(&self) -> Contact {
        Contact {
            id: self.id,
            requester_id: self.requester_id,
            recipient_id: self.recipient_id,
            status: self.status,
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
        merge(&mut self.requester_id, &incoming.requester_id);
        merge(&mut self.recipient_id, &incoming.recipient_id);
        merge(&mut self.status, &incoming.status);
        self.timestamps.merge(&incoming.timestamps);
    }

    fn derive_filter(&self) -> Filter {
        match (self.id, self.requester_id, self.recipient_id) {
            (Some(id), _, _) => Filter::new().with(ID_FIELD, id_value(id)),
            (None, Some(requester), Some(recipient)) => Filter::new()
                .with("requester_id", id_value(requester))
                .with("recipient_id", id_value(recipient)),
            _ => Filter::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_key_needs_both_sides() {
        let (a, b) = (EntityId::generate(), EntityId::generate());
        let pair = ContactRecord::from_domain(&Contact::request(a, b)).unwrap();
        assert_eq!(pair.derive_filter().len(), 2);

        let half = ContactRecord {
            requester_id: Some(a),
            ..Default::default()
        };
        assert!(half.derive_filter().is_empty());
    }

    #[test]
    fn status_update_is_partial() {
        let (a, b) = (EntityId::generate(), EntityId::generate());
        let mut stored = ContactRecord::from_domain(&Contact::request(a, b)).unwrap();
        let patch = ContactRecord {
            status: Some(ContactStatus::Approved),
            ..Default::default()
        };
        stored.apply_partial_update(&patch);
        assert_eq!(stored.status, Some(ContactStatus::Approved));
        assert_eq!(stored.requester_id, Some(a));
        assert_eq!(stored.recipient_id, Some(b));
    }
}
