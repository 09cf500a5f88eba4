use courier_store::Database;
use courier_types::{Contact, EntityId, User, Validate, ValidationCase};

use crate::config::StoreConfig;
use crate::coordinator::ConsistencyCoordinator;
use crate::error::{DbError, DbResult};
use crate::models::{ContactRecord, UserRecord};
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct ContactService {
    contacts: DocumentStore<ContactRecord>,
    users: DocumentStore<UserRecord>,
}

impl ContactService {
    pub fn new(db: &dyn Database, config: StoreConfig) -> Self {
        Self {
            contacts: DocumentStore::new(db, config),
            users: DocumentStore::new(db, config),
        }
    }

    /// Record a contact request between two existing users.
    pub async fn create(&self, contact: &Contact) -> DbResult<Contact> {
        contact.validate(ValidationCase::Create)?;
        let (Some(requester), Some(recipient)) = (contact.requester_id, contact.recipient_id) else {
            return Err(DbError::Validation(
                "missing the following contact fields: requester_id, recipient_id".into(),
            ));
        };

        let requesters = self.users.clone();
        let recipients = self.users.clone();
        ConsistencyCoordinator::require_both(
            ("requester", async move { requesters.find_one(&User::with_id(requester)).await }),
            ("recipient", async move { recipients.find_one(&User::with_id(recipient)).await }),
        )
        .await?;

        self.contacts.insert_one(contact).await
    }

    pub async fn find(&self, contact: &Contact) -> DbResult<Contact> {
        self.contacts.find_one(contact).await
    }

    pub async fn find_all(&self, contact: &Contact) -> DbResult<Vec<Contact>> {
        self.contacts.find_many(contact).await
    }

    /// Contacts where `user` is the requester or the recipient.
    pub async fn find_for_user(&self, user: EntityId) -> DbResult<Vec<Contact>> {
        let all = self.contacts.find_many(&Contact::default()).await?;
        Ok(all
            .into_iter()
            .filter(|c| c.requester_id == Some(user) || c.recipient_id == Some(user))
            .collect())
    }

    /// Change a contact's status.
    pub async fn update(&self, contact: &Contact) -> DbResult<Contact> {
        contact.validate(ValidationCase::Update)?;
        let id = contact
            .id
            .ok_or_else(|| DbError::Validation("missing the following contact fields: id".into()))?;
        self.contacts.update_one(&Contact::with_id(id), contact).await
    }

    pub async fn delete(&self, contact: &Contact) -> DbResult<Contact> {
        self.contacts.delete_one(contact).await
    }

    pub async fn doc_insert(&self, contact: &Contact) -> DbResult<Contact> {
        self.contacts.insert_raw(contact).await
    }
}
