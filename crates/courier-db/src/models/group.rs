use courier_store::{Filter, ID_FIELD};
use courier_types::id::{self, EntityId};
use courier_types::Group;
use serde::{Deserialize, Serialize};

use super::{id_value, merge, non_empty, Timestamps};
use crate::adapter::ModelAdapter;
use crate::error::DbResult;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(rename = "_id", default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl ModelAdapter for GroupRecord {
    type Entity = Group;
    const COLLECTION: &'static str = "groups";

    fn from_domain(group: &Group) -> DbResult<Self> {
        Ok(Self {
            id: group.id,
            name: non_empty(&group.name),
            description: non_empty(&group.description),
            timestamps: Timestamps::new(group.created_at, group.updated_at, group.deleted_at),
        })
    }

    fn to_domain(&self) -> Group {
        Group {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
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
        merge(&mut self.name, &incoming.name);
        merge(&mut self.description, &incoming.description);
        self.timestamps.merge(&incoming.timestamps);
    }

    fn derive_filter(&self) -> Filter {
        if let Some(id) = self.id {
            Filter::new().with(ID_FIELD, id_value(id))
        } else if let Some(name) = &self.name {
            Filter::new().with("name", name.as_str())
        } else {
            Filter::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_types::SENTINEL_HEX;
    use serde_json::json;

    #[test]
    fn sentinel_id_derives_like_an_absent_one() {
        let from_sentinel: Group =
            serde_json::from_value(json!({"id": SENTINEL_HEX, "name": "crew"})).unwrap();
        let from_empty: Group = serde_json::from_value(json!({"id": "", "name": "crew"})).unwrap();
        let a = GroupRecord::from_domain(&from_sentinel).unwrap();
        let b = GroupRecord::from_domain(&from_empty).unwrap();
        assert_eq!(a.derive_filter(), b.derive_filter());
        assert_eq!(a.derive_filter(), Filter::new().with("name", "crew"));
    }

    #[test]
    fn matches_by_name_when_query_has_no_id() {
        let stored = GroupRecord {
            id: Some(EntityId::generate()),
            name: Some("crew".into()),
            ..Default::default()
        };
        let query = json!({"name": "crew"});
        let other = json!({"name": "band"});
        assert!(stored.matches(query.as_object().unwrap()));
        assert!(!stored.matches(other.as_object().unwrap()));
    }

    #[test]
    fn query_without_discriminator_matches_nothing() {
        let stored = GroupRecord {
            id: Some(EntityId::generate()),
            name: Some("crew".into()),
            ..Default::default()
        };
        let blank = json!({"description": "anything"});
        let sentinel = json!({"_id": SENTINEL_HEX});
        let broken = json!({"_id": "not-hex"});
        assert!(!stored.matches(blank.as_object().unwrap()));
        assert!(!stored.matches(sentinel.as_object().unwrap()));
        assert!(!stored.matches(broken.as_object().unwrap()));
    }
}
