use courier_store::Database;
use courier_types::{EntityId, GroupMembership, Validate, ValidationCase};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};
use crate::models::GroupMembershipRecord;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct GroupMembershipService {
    store: DocumentStore<GroupMembershipRecord>,
}

impl GroupMembershipService {
    pub fn new(db: &dyn Database, config: StoreConfig) -> Self {
        Self {
            store: DocumentStore::new(db, config),
        }
    }

    /// Add a user to a group. A second membership for the same pair is a
    /// [`DbError::Duplicate`].
    pub async fn create(&self, membership: &GroupMembership) -> DbResult<GroupMembership> {
        membership.validate(ValidationCase::Create)?;
        let created = self.store.insert_one(membership).await?;
        debug!(
            group_id = ?created.group_id,
            user_id = ?created.user_id,
            admin = created.admin,
            "membership created"
        );
        Ok(created)
    }

    pub async fn find(&self, membership: &GroupMembership) -> DbResult<GroupMembership> {
        self.store.find_one(membership).await
    }

    pub async fn find_all(&self, membership: &GroupMembership) -> DbResult<Vec<GroupMembership>> {
        self.store.find_many(membership).await
    }

    /// Every membership of `group`, in storage order.
    pub async fn find_for_group(&self, group: EntityId) -> DbResult<Vec<GroupMembership>> {
        self.store.find_many(&GroupMembership::in_group(group)).await
    }

    pub async fn update(&self, membership: &GroupMembership) -> DbResult<GroupMembership> {
        membership.validate(ValidationCase::Update)?;
        let id = membership.id.ok_or_else(|| {
            DbError::Validation("missing the following group membership fields: id".into())
        })?;
        self.store
            .update_one(&GroupMembership::with_id(id), membership)
            .await
    }

    pub async fn delete(&self, membership: &GroupMembership) -> DbResult<GroupMembership> {
        self.store.delete_one(membership).await
    }

    pub async fn doc_insert(&self, membership: &GroupMembership) -> DbResult<GroupMembership> {
        self.store.insert_raw(membership).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_store::InMemoryDatabase;

    fn service() -> GroupMembershipService {
        GroupMembershipService::new(&InMemoryDatabase::new(), StoreConfig::default())
    }

    #[tokio::test]
    async fn same_pair_twice_is_duplicate() {
        let memberships = service();
        let (g, u) = (EntityId::generate(), EntityId::generate());
        memberships.create(&GroupMembership::of(g, u)).await.unwrap();
        let err = memberships.create(&GroupMembership::of(g, u)).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { .. }));
        assert_eq!(memberships.find_for_group(g).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_by_pair() {
        let memberships = service();
        let (g, u) = (EntityId::generate(), EntityId::generate());
        memberships.create(&GroupMembership::of(g, u)).await.unwrap();
        let removed = memberships.delete(&GroupMembership::of(g, u)).await.unwrap();
        assert_eq!(removed.user_id, Some(u));
        assert!(memberships.find_for_group(g).await.unwrap().is_empty());
        assert!(memberships
            .delete(&GroupMembership::of(g, u))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn promote_to_admin() {
        let memberships = service();
        let created = memberships
            .create(&GroupMembership::of(EntityId::generate(), EntityId::generate()))
            .await
            .unwrap();
        assert!(!created.admin);
        let mut patch = GroupMembership::with_id(created.id.unwrap());
        patch.admin = true;
        assert!(memberships.update(&patch).await.unwrap().admin);
    }
}
