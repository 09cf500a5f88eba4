use courier_store::Database;
use courier_types::{Group, GroupMembership, Validate, ValidationCase};
use serde::Serialize;
use tracing::info;

use crate::config::StoreConfig;
use crate::coordinator::ConsistencyCoordinator;
use crate::error::{DbError, DbResult};
use crate::models::{GroupMembershipRecord, GroupRecord};
use crate::store::DocumentStore;

/// A group together with every membership in it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupDetail {
    pub group: Group,
    pub memberships: Vec<GroupMembership>,
}

#[derive(Clone)]
pub struct GroupService {
    groups: DocumentStore<GroupRecord>,
    memberships: DocumentStore<GroupMembershipRecord>,
}

impl GroupService {
    pub fn new(db: &dyn Database, config: StoreConfig) -> Self {
        Self {
            groups: DocumentStore::new(db, config),
            memberships: DocumentStore::new(db, config),
        }
    }

    pub async fn create(&self, group: &Group) -> DbResult<Group> {
        group.validate(ValidationCase::Create)?;
        let created = self.groups.insert_one(group).await?;
        info!(group_id = ?created.id, "group created");
        Ok(created)
    }

    pub async fn find(&self, group: &Group) -> DbResult<Group> {
        self.groups.find_one(group).await
    }

    pub async fn find_all(&self, group: &Group) -> DbResult<Vec<Group>> {
        self.groups.find_many(group).await
    }

    pub async fn update(&self, group: &Group) -> DbResult<Group> {
        group.validate(ValidationCase::Update)?;
        let id = group
            .id
            .ok_or_else(|| DbError::Validation("missing the following group fields: id".into()))?;
        self.groups.update_one(&Group::with_id(id), group).await
    }

    pub async fn delete(&self, group: &Group) -> DbResult<Group> {
        self.groups.delete_one(group).await
    }

    pub async fn doc_insert(&self, group: &Group) -> DbResult<Group> {
        self.groups.insert_raw(group).await
    }

    /// The group and its memberships, fetched concurrently.
    pub async fn detail(&self, group: &Group) -> DbResult<GroupDetail> {
        let id = group
            .id
            .ok_or_else(|| DbError::Validation("missing the following group fields: id".into()))?;
        let groups = self.groups.clone();
        let memberships = self.memberships.clone();

        let (group, memberships) = ConsistencyCoordinator::assemble(
            async move { groups.find_one(&Group::with_id(id)).await },
            async move { memberships.find_many(&GroupMembership::in_group(id)).await },
        )
        .await?;
        Ok(GroupDetail { group, memberships })
    }
}
