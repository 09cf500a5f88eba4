use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{self, EntityId};
use crate::validation::{filled, Checklist, Validate, ValidationCase};

/// A registered account.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Plain text on the way in, an argon2 PHC string once stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub image_id: Option<EntityId>,
    #[serde(default)]
    pub root_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// A query selecting a user by id.
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// A query selecting a user by email.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    /// Replace the plain-text password with its argon2 hash.
    pub fn hash_password(&mut self) -> Result<(), TypeError> {
        let plain = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| TypeError::Password("no password set to hash".into()))?;
        let salt = SaltString::generate(&mut OsRng);
        let hashed = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| TypeError::Password(e.to_string()))?
            .to_string();
        self.password = Some(hashed);
        Ok(())
    }

    /// Compare a candidate password against the stored hash.
    pub fn authenticate(&self, candidate: &str) -> Result<(), TypeError> {
        let stored = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| TypeError::Password("no password hash stored".into()))?;
        let parsed = PasswordHash::new(stored).map_err(|e| TypeError::Password(e.to_string()))?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|_| TypeError::Password("invalid credentials".into()))
    }

    /// Strip secrets before the user leaves the process.
    pub fn cleaned(mut self) -> Self {
        self.password = None;
        self
    }
}

impl Validate for User {
    fn validate(&self, case: ValidationCase) -> Result<(), TypeError> {
        let mut check = Checklist::new("user");
        match case {
            ValidationCase::Auth => {
                check.require(self.id.is_some(), "id");
            }
            ValidationCase::Create => {
                check
                    .require(filled(&self.username), "username")
                    .require(filled(&self.email), "email")
                    .require(filled(&self.password), "password")
                    .require(filled(&self.phone), "phone");
            }
            ValidationCase::Update => {
                check.require(self.id.is_some() || filled(&self.email), "id");
            }
        }
        check.finish()
    }
}
