use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{self, EntityId};
use crate::validation::{filled, Checklist, Validate, ValidationCase};

/// A chat message.
///
/// `group` decides what `receiver_id` names: a group when `true`, a user
/// otherwise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// A direct message from one user to another.
    pub fn direct(sender: EntityId, receiver: EntityId, content: impl Into<String>) -> Self {
        Self {
            sender_id: Some(sender),
            receiver_id: Some(receiver),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A message posted to a group.
    pub fn to_group(sender: EntityId, group: EntityId, content: impl Into<String>) -> Self {
        Self {
            group: true,
            ..Self::direct(sender, group, content)
        }
    }
}

impl Validate for Message {
    fn validate(&self, case: ValidationCase) -> Result<(), TypeError> {
        let mut check = Checklist::new("message");
        match case {
            ValidationCase::Create => {
                check
                    .require(self.sender_id.is_some(), "sender_id")
                    .require(self.receiver_id.is_some(), "receiver_id")
                    .require(filled(&self.content), "content");
            }
            ValidationCase::Update => {
                check.require(self.id.is_some(), "id");
            }
            ValidationCase::Auth => return Err(check.unsupported(case)),
        }
        check.finish()
    }
}
