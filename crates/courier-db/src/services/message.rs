use courier_store::Database;
use courier_types::{EntityId, Group, Message, User, Validate, ValidationCase};
use tracing::debug;

use crate::config::StoreConfig;
use crate::coordinator::ConsistencyCoordinator;
use crate::error::{DbError, DbResult};
use crate::models::{GroupRecord, MessageRecord, UserRecord};
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct MessageService {
    messages: DocumentStore<MessageRecord>,
    users: DocumentStore<UserRecord>,
    groups: DocumentStore<GroupRecord>,
}

impl MessageService {
    pub fn new(db: &dyn Database, config: StoreConfig) -> Self {
        Self {
            messages: DocumentStore::new(db, config),
            users: DocumentStore::new(db, config),
            groups: DocumentStore::new(db, config),
        }
    }

    /// Persist a message once its receiver (user or group) and sender are
    /// confirmed to exist.
    pub async fn create(&self, msg: &Message) -> DbResult<Message> {
        msg.validate(ValidationCase::Create)?;
        let (Some(sender), Some(receiver)) = (msg.sender_id, msg.receiver_id) else {
            return Err(DbError::Validation(
                "missing the following message fields: sender_id, receiver_id".into(),
            ));
        };

        if msg.group {
            self.check_group_message(receiver, sender).await?;
        } else {
            self.check_direct_message(receiver, sender).await?;
        }

        let created = self.messages.insert_one(msg).await?;
        debug!(message_id = ?created.id, group = created.group, "message created");
        Ok(created)
    }

    async fn check_group_message(&self, group: EntityId, sender: EntityId) -> DbResult<()> {
        let groups = self.groups.clone();
        let users = self.users.clone();
        ConsistencyCoordinator::require_both(
            ("group", async move { groups.find_one(&Group::with_id(group)).await }),
            ("user", async move { users.find_one(&User::with_id(sender)).await }),
        )
        .await?;
        Ok(())
    }

    async fn check_direct_message(&self, receiver: EntityId, sender: EntityId) -> DbResult<()> {
        let receivers = self.users.clone();
        let senders = self.users.clone();
        ConsistencyCoordinator::require_both(
            ("receiver", async move { receivers.find_one(&User::with_id(receiver)).await }),
            ("sender", async move { senders.find_one(&User::with_id(sender)).await }),
        )
        .await?;
        Ok(())
    }

    pub async fn find(&self, msg: &Message) -> DbResult<Message> {
        self.messages.find_one(msg).await
    }

    pub async fn find_all(&self, msg: &Message) -> DbResult<Vec<Message>> {
        self.messages.find_many(msg).await
    }

    pub async fn update(&self, msg: &Message) -> DbResult<Message> {
        msg.validate(ValidationCase::Update)?;
        let id = msg
            .id
            .ok_or_else(|| DbError::Validation("missing the following message fields: id".into()))?;
        self.messages.update_one(&Message::with_id(id), msg).await
    }

    pub async fn delete(&self, msg: &Message) -> DbResult<Message> {
        self.messages.delete_one(msg).await
    }

    pub async fn doc_insert(&self, msg: &Message) -> DbResult<Message> {
        self.messages.insert_raw(msg).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_store::InMemoryDatabase;

    struct Fixture {
        messages: MessageService,
        users: DocumentStore<UserRecord>,
        groups: DocumentStore<GroupRecord>,
    }

    fn fixture() -> Fixture {
        let db = InMemoryDatabase::new();
        let config = StoreConfig::default();
        Fixture {
            messages: MessageService::new(&db, config),
            users: DocumentStore::new(&db, config),
            groups: DocumentStore::new(&db, config),
        }
    }

    async fn user(f: &Fixture, name: &str) -> EntityId {
        let user = User {
            username: Some(name.into()),
            email: Some(format!("{name}@example.com")),
            ..Default::default()
        };
        f.users.insert_one(&user).await.unwrap().id.unwrap()
    }

    #[tokio::test]
    async fn direct_message_between_known_users() {
        let f = fixture();
        let (a, b) = (user(&f, "a").await, user(&f, "b").await);
        let msg = f.messages.create(&Message::direct(a, b, "hi")).await.unwrap();
        let found = f.messages.find(&Message::with_id(msg.id.unwrap())).await.unwrap();
        assert_eq!(found.content.as_deref(), Some("hi"));
        assert_eq!(found.sender_id, Some(a));
    }

    #[tokio::test]
    async fn unknown_receiver_is_rejected_and_not_persisted() {
        let f = fixture();
        let a = user(&f, "a").await;
        let err = f
            .messages
            .create(&Message::direct(a, EntityId::generate(), "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Dependency(ref m) if m == "invalid receiver id"));
        assert!(f.messages.find_all(&Message::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_sender_is_rejected() {
        let f = fixture();
        let b = user(&f, "b").await;
        let err = f
            .messages
            .create(&Message::direct(EntityId::generate(), b, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Dependency(ref m) if m == "invalid sender id"));
    }

    #[tokio::test]
    async fn both_unknown_reports_receiver() {
        let f = fixture();
        let err = f
            .messages
            .create(&Message::direct(EntityId::generate(), EntityId::generate(), "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid receiver id");
    }

    #[tokio::test]
    async fn group_message_checks_the_group() {
        let f = fixture();
        let a = user(&f, "a").await;
        let missing = f
            .messages
            .create(&Message::to_group(a, EntityId::generate(), "hello"))
            .await
            .unwrap_err();
        assert_eq!(missing.to_string(), "invalid group id");

        let group = f.groups.insert_one(&Group::named("crew")).await.unwrap();
        let msg = f
            .messages
            .create(&Message::to_group(a, group.id.unwrap(), "hello"))
            .await
            .unwrap();
        assert!(msg.group);
    }

    #[tokio::test]
    async fn find_all_by_receiver() {
        let f = fixture();
        let (a, b, c) = (user(&f, "a").await, user(&f, "b").await, user(&f, "c").await);
        f.messages.create(&Message::direct(a, b, "1")).await.unwrap();
        f.messages.create(&Message::direct(c, b, "2")).await.unwrap();
        f.messages.create(&Message::direct(b, a, "3")).await.unwrap();

        let mut query = Message::default();
        query.receiver_id = Some(b);
        let inbox = f.messages.find_all(&query).await.unwrap();
        let texts: Vec<_> = inbox.iter().filter_map(|m| m.content.as_deref()).collect();
        assert_eq!(texts, ["1", "2"]);
    }

    #[tokio::test]
    async fn validation_happens_before_lookups() {
        let f = fixture();
        let err = f.messages.create(&Message::default()).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
