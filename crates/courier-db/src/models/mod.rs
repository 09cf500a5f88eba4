//! Storage records, one per domain entity, each implementing
//! [`ModelAdapter`](crate::ModelAdapter).

mod contact;
mod conversation;
mod group;
mod membership;
mod message;
mod user;

pub use contact::ContactRecord;
pub use conversation::ConversationRecord;
pub use group::GroupRecord;
pub use membership::GroupMembershipRecord;
pub use message::MessageRecord;
pub use user::UserRecord;

use chrono::{DateTime, Utc};
use courier_types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle stamps carried by every stored document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    pub fn new(
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            created_at,
            updated_at,
            deleted_at,
        }
    }

    /// `created_at` is set only for new records; `updated_at` always. A new
    /// record starts live, whatever `deleted_at` the caller sent.
    pub fn stamp(&mut self, is_new: bool) {
        let now = Utc::now();
        if is_new {
            self.created_at = Some(now);
            self.deleted_at = None;
        }
        self.updated_at = Some(now);
    }

    /// Caller-supplied stamps are ignored except a soft delete.
    pub fn merge(&mut self, incoming: &Timestamps) {
        if incoming.deleted_at.is_some() {
            self.deleted_at = incoming.deleted_at;
        }
    }
}

pub(crate) fn id_value(id: EntityId) -> Value {
    Value::String(id.to_hex())
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Empty strings are stored as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Overwrite `dst` only when `src` is populated.
pub(crate) fn merge<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(value) = src {
        *dst = Some(value.clone());
    }
}
