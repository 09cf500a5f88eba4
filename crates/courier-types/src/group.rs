use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{self, EntityId};
use crate::validation::{filled, Checklist, Validate, ValidationCase};

/// A named chat group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl Validate for Group {
    fn validate(&self, case: ValidationCase) -> Result<(), TypeError> {
        let mut check = Checklist::new("group");
        match case {
            ValidationCase::Create => {
                check.require(filled(&self.name), "name");
            }
            ValidationCase::Update => {
                check.require(self.id.is_some(), "id");
            }
            ValidationCase::Auth => return Err(check.unsupported(case)),
        }
        check.finish()
    }
}
