use chrono::{DateTime, Utc};
use courier_store::{Filter, ID_FIELD};
use courier_types::id::{self, EntityId};
use courier_types::User;
use serde::{Deserialize, Serialize};

use super::{id_value, is_false, merge, non_empty, Timestamps};
use crate::adapter::ModelAdapter;
use crate::error::DbResult;

/// Storage shape of a [`User`]. `password` holds the argon2 hash.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub image_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub root_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl ModelAdapter for UserRecord {
    type Entity = User;
    const COLLECTION: &'static str = "users";

    fn from_domain(user: &User) -> DbResult<Self> {
        Ok(Self {
            id: user.id,
            username: non_empty(&user.username),
            password: non_empty(&user.password),
            email: non_empty(&user.email),
            phone: non_empty(&user.phone),
            image_id: user.image_id,
            root_admin: user.root_admin,
            last_active: user.last_active,
            timestamps: Timestamps::new(user.created_at, user.updated_at, user.deleted_at),
        })
    }

    fn to_domain(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            password: self.password.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            image_id: self.image_id,
            root_admin: self.root_admin,
            last_active: self.last_active,
            created_at: self.timestamps.created_at,
            updated_at: self.timestamps.updated_at,
            deleted_at: self.timestamps.deleted_at,
        }
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn apply_partial_update(&mut self, incoming: &Self) {
        merge(&mut self.username, &incoming.username);
        merge(&mut self.password, &incoming.password);
        merge(&mut self.email, &incoming.email);
        merge(&mut self.phone, &incoming.phone);
        merge(&mut self.image_id, &incoming.image_id);
        merge(&mut self.last_active, &incoming.last_active);
        if incoming.root_admin {
            self.root_admin = true;
        }
        self.timestamps.merge(&incoming.timestamps);
    }

    fn derive_filter(&self) -> Filter {
        if let Some(id) = self.id {
            Filter::new().with(ID_FIELD, id_value(id))
        } else if let Some(email) = &self.email {
            Filter::new().with("email", email.as_str())
        } else if let Some(username) = &self.username {
            Filter::new().with("username", username.as_str())
        } else {
            Filter::new()
        }
    }
}
