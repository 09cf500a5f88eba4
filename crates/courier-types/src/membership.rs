use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{self, EntityId};
use crate::validation::{Checklist, Validate, ValidationCase};

/// Membership of a user in a group. `(group_id, user_id)` is its natural key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl GroupMembership {
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Query or new record for `user` in `group`.
    pub fn of(group: EntityId, user: EntityId) -> Self {
        Self {
            group_id: Some(group),
            user_id: Some(user),
            ..Default::default()
        }
    }

    /// Query selecting every membership of `group`.
    pub fn in_group(group: EntityId) -> Self {
        Self {
            group_id: Some(group),
            ..Default::default()
        }
    }
}

impl Validate for GroupMembership {
    fn validate(&self, case: ValidationCase) -> Result<(), TypeError> {
        let mut check = Checklist::new("group membership");
        match case {
            ValidationCase::Create => {
                check
                    .require(self.group_id.is_some(), "group_id")
                    .require(self.user_id.is_some(), "user_id");
            }
            ValidationCase::Update => {
                check.require(self.id.is_some(), "id");
            }
            ValidationCase::Auth => return Err(check.unsupported(case)),
        }
        check.finish()
    }
}
