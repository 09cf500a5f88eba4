use courier_store::{Filter, ID_FIELD};
use courier_types::id::{self, EntityId};
use courier_types::GroupMembership;
use serde::{Deserialize, Serialize};

use super::{id_value, is_false, merge, Timestamps};
use crate::adapter::ModelAdapter;
use crate::error::DbResult;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMembershipRecord {
    #[serde(rename = "_id", default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub admin: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl ModelAdapter for GroupMembershipRecord {
    type Entity = GroupMembership;
    const COLLECTION: &'static str = "group_memberships";

    fn from_domain(m: &GroupMembership) -> DbResult<Self> {
        Ok(Self {
            id: m.id,
            group_id: m.group_id,
            user_id: m.user_id,
            admin: m.admin,
            timestamps: Timestamps::new(m.created_at, m.updated_at, m.deleted_at),
        })
    }

    fn to_domain(&self) -> GroupMembership {
        GroupMembership {
            id: self.id,
            group_id: self.group_id,
            user_id: self.user_id,
            admin: self.admin,
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
        merge(&mut self.group_id, &incoming.group_id);
        merge(&mut self.user_id, &incoming.user_id);
        if incoming.admin {
            self.admin = true;
        }
        self.timestamps.merge(&incoming.timestamps);
    }

    fn derive_filter(&self) -> Filter {
        match (self.id, self.group_id, self.user_id) {
            (Some(id), _, _) => Filter::new().with(ID_FIELD, id_value(id)),
            (None, Some(group), Some(user)) => Filter::new()
                .with("group_id", id_value(group))
                .with("user_id", id_value(user)),
            (None, Some(group), None) => Filter::new().with("group_id", id_value(group)),
            (None, None, Some(user)) => Filter::new().with("user_id", id_value(user)),
            (None, None, None) => Filter::new(),
        }
    }
}
