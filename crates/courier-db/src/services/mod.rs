//! Per-entity services: validation, relationship checks, then the store.

mod contact;
mod conversation;
mod group;
mod membership;
mod message;
mod user;

pub use contact::ContactService;
pub use conversation::ConversationService;
pub use group::{GroupDetail, GroupService};
pub use membership::GroupMembershipService;
pub use message::MessageService;
pub use user::UserService;

use courier_store::{Database, InMemoryDatabase};
use courier_types::{EntityId, Group, GroupMembership};
use tracing::warn;

use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};

/// Every service, wired over one database.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub groups: GroupService,
    pub messages: MessageService,
    pub conversations: ConversationService,
    pub contacts: ContactService,
    pub memberships: GroupMembershipService,
}

impl Services {
    pub fn new(db: &dyn Database, config: StoreConfig) -> Self {
        Self {
            users: UserService::new(db, config),
            groups: GroupService::new(db, config),
            messages: MessageService::new(db, config),
            conversations: ConversationService::new(db, config),
            contacts: ContactService::new(db, config),
            memberships: GroupMembershipService::new(db, config),
        }
    }

    /// Services over a fresh [`InMemoryDatabase`].
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::new(&InMemoryDatabase::new(), config)
    }

    /// Create a group and make `creator` its first admin.
    ///
    /// Not atomic: if the membership insert fails the group remains.
    pub async fn create_group_with_admin(
        &self,
        group: &Group,
        creator: EntityId,
    ) -> DbResult<(Group, GroupMembership)> {
        let group = self.groups.create(group).await?;
        let id = group
            .id
            .ok_or_else(|| DbError::Internal("created group has no id".into()))?;
        let admin = GroupMembership {
            admin: true,
            ..GroupMembership::of(id, creator)
        };
        let membership = self.memberships.create(&admin).await.inspect_err(|e| {
            warn!(group_id = %id, error = %e, "group created without its admin membership");
        })?;
        Ok((group, membership))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn group_creator_becomes_admin() {
        let services = Services::in_memory(StoreConfig::default());
        let creator = EntityId::generate();
        let (group, membership) = services
            .create_group_with_admin(&Group::named("crew"), creator)
            .await
            .unwrap();
        assert!(membership.admin);
        assert_eq!(membership.group_id, group.id);
        assert_eq!(membership.user_id, Some(creator));

        let detail = services.groups.detail(&group).await.unwrap();
        assert_eq!(detail.memberships, vec![membership]);
    }
}
