use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{self, EntityId};
use crate::validation::{Checklist, Validate, ValidationCase};

/// Lifecycle of a contact request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

/// A contact relationship requested by one user of another.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<EntityId>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Contact {
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// A pending request from `requester` to `recipient`.
    pub fn request(requester: EntityId, recipient: EntityId) -> Self {
        Self {
            requester_id: Some(requester),
            recipient_id: Some(recipient),
            status: Some(ContactStatus::Pending),
            ..Default::default()
        }
    }
}

impl Validate for Contact {
    fn validate(&self, case: ValidationCase) -> Result<(), TypeError> {
        let mut check = Checklist::new("contact");
        match case {
            ValidationCase::Create => {
                check
                    .require(self.requester_id.is_some(), "requester_id")
                    .require(self.recipient_id.is_some(), "recipient_id");
            }
            ValidationCase::Update => {
                check
                    .require(self.id.is_some(), "id")
                    .require(self.status.is_some(), "status");
            }
            ValidationCase::Auth => return Err(check.unsupported(case)),
        }
        check.finish()
    }
}
