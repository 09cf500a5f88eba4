use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{self, EntityId};
use crate::validation::{Checklist, Validate, ValidationCase};

/// A conversation thread between participants.
///
/// For group conversations `participants_ids` holds the group id only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, with = "id::list", skip_serializing_if = "Vec::is_empty")]
    pub participants_ids: Vec<EntityId>,
    #[serde(default)]
    pub group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn between(participants: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            participants_ids: participants.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn has_participant(&self, id: &EntityId) -> bool {
        self.participants_ids.contains(id)
    }
}

impl Validate for Conversation {
    fn validate(&self, case: ValidationCase) -> Result<(), TypeError> {
        let mut check = Checklist::new("conversation");
        match case {
            ValidationCase::Create => {
                check.require(!self.participants_ids.is_empty(), "participants_ids");
            }
            ValidationCase::Update => {
                check.require(self.id.is_some(), "id");
            }
            ValidationCase::Auth => return Err(check.unsupported(case)),
        }
        check.finish()
    }
}
