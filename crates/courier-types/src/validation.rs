use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The operation class an entity is being validated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationCase {
    Create,
    Update,
    Auth,
}

impl ValidationCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Auth => "auth",
        }
    }
}

impl fmt::Display for ValidationCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required-field checks run before any store access.
pub trait Validate {
    fn validate(&self, case: ValidationCase) -> Result<(), TypeError>;
}

/// Accumulates missing fields so every gap is reported at once.
pub(crate) struct Checklist {
    entity: &'static str,
    missing: Vec<&'static str>,
}

impl Checklist {
    pub(crate) fn new(entity: &'static str) -> Self {
        Self {
            entity,
            missing: Vec::new(),
        }
    }

    pub(crate) fn require(&mut self, present: bool, field: &'static str) -> &mut Self {
        if !present {
            self.missing.push(field);
        }
        self
    }

    pub(crate) fn unsupported(&self, case: ValidationCase) -> TypeError {
        TypeError::UnsupportedCase {
            entity: self.entity,
            case: case.as_str(),
        }
    }

    pub(crate) fn finish(&mut self) -> Result<(), TypeError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(TypeError::MissingFields {
                entity: self.entity,
                fields: std::mem::take(&mut self.missing),
            })
        }
    }
}

/// `true` when an optional string is present and non-empty.
pub(crate) fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}
