use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use courier_db::DbError;
use courier_types::{Contact, Conversation, EntityId, Group, GroupMembership, Message, User};
use serde::de::DeserializeOwned;

use crate::auth::{Caller, Identity};
use crate::dto::{
    ContactsResponse, ConversationsResponse, GroupUsersResponse, GroupsResponse, HealthResponse,
    MemberRequest, MessagesResponse, SignIn, SignInResponse, UserResponse,
};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

fn decode<T: DeserializeOwned>(body: &Bytes) -> ServerResult<T> {
    serde_json::from_slice(body).map_err(|e| ServerError::BadRequest(format!("invalid body: {e}")))
}

fn path_id(raw: &str, what: &str) -> ServerResult<EntityId> {
    match EntityId::parse(raw) {
        Ok(Some(id)) => Ok(id),
        _ => Err(ServerError::BadRequest(format!("missing {what} id"))),
    }
}

/// Root admins pass; anyone else needs an admin membership in `group`.
async fn require_group_admin(state: &AppState, caller: &Identity, group: EntityId) -> ServerResult<()> {
    if caller.root_admin {
        return Ok(());
    }
    match state
        .services
        .memberships
        .find(&GroupMembership::of(group, caller.user_id))
        .await
    {
        Ok(m) if m.admin => Ok(()),
        Ok(_) => Err(ServerError::Forbidden("group admin required".into())),
        Err(e) if e.is_not_found() => Err(ServerError::Forbidden("group admin required".into())),
        Err(e) => Err(e.into()),
    }
}

/// Whether the caller holds any membership in `group`.
async fn is_member(state: &AppState, caller: &Identity, group: EntityId) -> ServerResult<bool> {
    match state
        .services
        .memberships
        .find(&GroupMembership::of(group, caller.user_id))
        .await
    {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn list_groups(State(state): State<AppState>, _caller: Caller) -> ServerResult<Json<GroupsResponse>> {
    let groups = state.services.groups.find_all(&Group::default()).await?;
    Ok(Json(GroupsResponse { groups }))
}

pub async fn create_group(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<Group>)> {
    let mut group: Group = decode(&body)?;
    group.id = None;
    let (group, _) = state
        .services
        .create_group_with_admin(&group, caller.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn show_group(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<Group>> {
    let id = path_id(&id, "group")?;
    Ok(Json(state.services.groups.find(&Group::with_id(id)).await?))
}

pub async fn modify_group(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<Group>)> {
    let id = path_id(&id, "group")?;
    require_group_admin(&state, &caller, id).await?;
    let mut patch: Group = decode(&body)?;
    patch.id = Some(id);
    let group = state.services.groups.update(&patch).await?;
    Ok((StatusCode::ACCEPTED, Json(group)))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<Group>> {
    let id = path_id(&id, "group")?;
    require_group_admin(&state, &caller, id).await?;
    Ok(Json(state.services.groups.delete(&Group::with_id(id)).await?))
}

pub async fn group_users(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<GroupUsersResponse>> {
    let id = path_id(&id, "group")?;
    let detail = state.services.groups.detail(&Group::with_id(id)).await?;
    Ok(Json(GroupUsersResponse {
        group: detail.group,
        users: detail.memberships,
    }))
}

pub async fn add_group_user(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((group, user)): Path<(String, String)>,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<GroupMembership>)> {
    let group = path_id(&group, "group")?;
    let user = path_id(&user, "user")?;
    require_group_admin(&state, &caller, group).await?;
    let request: MemberRequest = if body.is_empty() {
        MemberRequest::default()
    } else {
        decode(&body)?
    };

    // Both ends must exist before the membership is written.
    state.services.groups.find(&Group::with_id(group)).await?;
    state.services.users.find(&User::with_id(user)).await.map_err(|e| {
        if e.is_not_found() {
            ServerError::Db(DbError::Dependency("invalid user id".into()))
        } else {
            e.into()
        }
    })?;

    let membership = GroupMembership {
        admin: request.admin,
        ..GroupMembership::of(group, user)
    };
    let created = state.services.memberships.create(&membership).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn remove_group_user(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((group, user)): Path<(String, String)>,
) -> ServerResult<Json<GroupMembership>> {
    let group = path_id(&group, "group")?;
    let user = path_id(&user, "user")?;
    require_group_admin(&state, &caller, group).await?;
    let removed = state
        .services
        .memberships
        .delete(&GroupMembership::of(group, user))
        .await?;
    Ok(Json(removed))
}

pub async fn create_message(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<Message>)> {
    let mut msg: Message = decode(&body)?;
    msg.id = None;
    msg.sender_id = Some(caller.user_id);
    let created = state.services.messages.create(&msg).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Direct messages addressed to the caller.
pub async fn list_messages(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ServerResult<Json<MessagesResponse>> {
    let query = Message {
        receiver_id: Some(caller.user_id),
        ..Default::default()
    };
    let messages = state.services.messages.find_all(&query).await?;
    Ok(Json(MessagesResponse { messages }))
}

pub async fn show_message(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<Message>> {
    let id = path_id(&id, "message")?;
    let msg = state.services.messages.find(&Message::with_id(id)).await?;
    if caller.root_admin || msg.sender_id == Some(caller.user_id) {
        return Ok(Json(msg));
    }
    let readable = match msg.receiver_id {
        Some(group) if msg.group => is_member(&state, &caller, group).await?,
        receiver => receiver == Some(caller.user_id),
    };
    if !readable {
        return Err(ServerError::Forbidden("not a party to this message".into()));
    }
    Ok(Json(msg))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<Message>> {
    let id = path_id(&id, "message")?;
    let msg = state.services.messages.find(&Message::with_id(id)).await?;
    if msg.sender_id != Some(caller.user_id) && !caller.root_admin {
        return Err(ServerError::Forbidden("only the sender may delete a message".into()));
    }
    Ok(Json(state.services.messages.delete(&Message::with_id(id)).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<UserResponse>)> {
    let mut user: User = decode(&body)?;
    user.id = None;
    user.root_admin = false;
    let user = state.services.users.create(&user).await?;
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

pub async fn show_user(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<UserResponse>> {
    let id = path_id(&id, "user")?;
    let user = state.services.users.find(&User::with_id(id)).await?.cleaned();
    Ok(Json(UserResponse { user }))
}

/// Verify credentials and issue a session token.
pub async fn sign_in(State(state): State<AppState>, body: Bytes) -> ServerResult<Json<SignInResponse>> {
    let request: SignIn = decode(&body)?;
    let user = state.services.users.authenticate(&request.to_user()?).await?;
    let user_id = user
        .id
        .ok_or_else(|| ServerError::Internal("authenticated user has no id".into()))?;
    let token = state.auth.issue(&Identity {
        user_id,
        root_admin: user.root_admin,
    })?;
    tracing::debug!(%user_id, "session token issued");
    Ok(Json(SignInResponse { user, token }))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ServerResult<Json<ConversationsResponse>> {
    let conversations = state
        .services
        .conversations
        .find_for_participant(caller.user_id)
        .await?;
    Ok(Json(ConversationsResponse { conversations }))
}

pub async fn create_conversation(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<Conversation>)> {
    let mut convo: Conversation = decode(&body)?;
    convo.id = None;
    if !convo.has_participant(&caller.user_id) {
        convo.participants_ids.push(caller.user_id);
    }
    let created = state.services.conversations.create(&convo).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Participants may see a conversation. For a group conversation the
/// participants are groups, and any member of one of them counts.
async fn require_participant(state: &AppState, caller: &Identity, convo: &Conversation) -> ServerResult<()> {
    if caller.root_admin || convo.has_participant(&caller.user_id) {
        return Ok(());
    }
    if convo.group {
        for group in &convo.participants_ids {
            if is_member(state, caller, *group).await? {
                return Ok(());
            }
        }
    }
    Err(ServerError::Forbidden("not a participant in this conversation".into()))
}

pub async fn show_conversation(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<Conversation>> {
    let id = path_id(&id, "conversation")?;
    let convo = state.services.conversations.find(&Conversation::with_id(id)).await?;
    require_participant(&state, &caller, &convo).await?;
    Ok(Json(convo))
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<Conversation>> {
    let id = path_id(&id, "conversation")?;
    let convo = state.services.conversations.find(&Conversation::with_id(id)).await?;
    require_participant(&state, &caller, &convo).await?;
    Ok(Json(state.services.conversations.delete(&Conversation::with_id(id)).await?))
}

fn require_contact_party(caller: &Identity, contact: &Contact) -> ServerResult<()> {
    let party = contact.requester_id == Some(caller.user_id) || contact.recipient_id == Some(caller.user_id);
    if party || caller.root_admin {
        Ok(())
    } else {
        Err(ServerError::Forbidden("not a party to this contact".into()))
    }
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ServerResult<Json<ContactsResponse>> {
    let contacts = state.services.contacts.find_for_user(caller.user_id).await?;
    Ok(Json(ContactsResponse { contacts }))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<Contact>)> {
    let mut contact: Contact = decode(&body)?;
    contact.id = None;
    contact.requester_id = Some(caller.user_id);
    let created = state.services.contacts.create(&contact).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn show_contact(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<Contact>> {
    let id = path_id(&id, "contact")?;
    let contact = state.services.contacts.find(&Contact::with_id(id)).await?;
    require_contact_party(&caller, &contact)?;
    Ok(Json(contact))
}

/// Only the recipient answers a contact request.
pub async fn modify_contact(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<Contact>)> {
    let id = path_id(&id, "contact")?;
    let patch: Contact = decode(&body)?;
    let contact = state.services.contacts.find(&Contact::with_id(id)).await?;
    if contact.recipient_id != Some(caller.user_id) && !caller.root_admin {
        return Err(ServerError::Forbidden("only the recipient may answer a contact request".into()));
    }
    let update = Contact {
        id: Some(id),
        status: patch.status,
        ..Default::default()
    };
    let updated = state.services.contacts.update(&update).await?;
    Ok((StatusCode::ACCEPTED, Json(updated)))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> ServerResult<Json<Contact>> {
    let id = path_id(&id, "contact")?;
    let contact = state.services.contacts.find(&Contact::with_id(id)).await?;
    require_contact_party(&caller, &contact)?;
    Ok(Json(state.services.contacts.delete(&Contact::with_id(id)).await?))
}
