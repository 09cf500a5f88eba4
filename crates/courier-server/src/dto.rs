//! Request and response bodies.

use courier_types::{Contact, Conversation, Group, GroupMembership, Message, User};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Body of `POST /v1/auth`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignIn {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignIn {
    pub fn to_user(&self) -> ServerResult<User> {
        if self.email.is_empty() {
            return Err(ServerError::BadRequest("missing user email".into()));
        }
        if self.password.is_empty() {
            return Err(ServerError::BadRequest("missing user password".into()));
        }
        Ok(User {
            email: Some(self.email.clone()),
            password: Some(self.password.clone()),
            ..Default::default()
        })
    }
}

/// Optional body of `POST /v1/groups/{id}/users/{user_id}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MemberRequest {
    #[serde(default)]
    pub admin: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Reply to a successful `POST /v1/auth`. `token` goes in the `Auth-Token`
/// header of later requests.
#[derive(Clone, Debug, Serialize)]
pub struct SignInResponse {
    pub user: User,
    pub token: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct GroupsResponse {
    pub groups: Vec<Group>,
}

/// A group with its memberships.
#[derive(Clone, Debug, Serialize)]
pub struct GroupUsersResponse {
    pub group: Group,
    pub users: Vec<GroupMembership>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContactsResponse {
    pub contacts: Vec<Contact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_requires_both_fields() {
        let empty = SignIn::default();
        assert!(matches!(empty.to_user(), Err(ServerError::BadRequest(m)) if m == "missing user email"));
        let no_pass = SignIn {
            email: "a@b.c".into(),
            ..Default::default()
        };
        assert!(no_pass.to_user().is_err());
        let ok = SignIn {
            email: "a@b.c".into(),
            password: "pw".into(),
        };
        assert_eq!(ok.to_user().unwrap().email.as_deref(), Some("a@b.c"));
    }
}
