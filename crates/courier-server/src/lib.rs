//! REST surface for the Courier messaging backend.
//!
//! Routes are thin: each decodes its body, resolves the caller from the
//! `Auth-Token` header, and hands off to a `courier-db` service. Service
//! errors map onto HTTP statuses in [`error`].

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AuthProvider, Caller, Credentials, Identity, TokenAuth, TokenClaims, AUTH_HEADER};
pub use config::{RootAdmin, ServerConfig, DEFAULT_TOKEN_SECRET};
pub use error::{ServerError, ServerResult};
pub use server::CourierServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use courier_db::{Services, StoreConfig};
    use courier_types::{EntityId, User};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    struct Harness {
        router: Router,
        services: Services,
        auth: TokenAuth,
        tokens: HashMap<String, String>,
    }

    impl Harness {
        /// A router with one signed session token per named user.
        async fn with_users(names: &[&str]) -> (Self, Vec<EntityId>) {
            let services = Services::in_memory(StoreConfig::default());
            let auth = TokenAuth::new("router-test-secret", Duration::from_secs(600)).unwrap();
            let mut tokens = HashMap::new();
            let mut ids = Vec::new();
            for name in names {
                let user = services
                    .users
                    .create(&User {
                        username: Some(name.to_string()),
                        email: Some(format!("{name}@example.com")),
                        password: Some("hunter2".into()),
                        phone: Some("555-0100".into()),
                        ..Default::default()
                    })
                    .await
                    .unwrap();
                let id = user.id.unwrap();
                tokens.insert(name.to_string(), auth.issue(&Identity::user(id)).unwrap());
                ids.push(id);
            }
            let state = AppState::new(services.clone(), Arc::new(auth.clone()));
            let router = router::build_router(state, 64 * 1024);
            (
                Self {
                    router,
                    services,
                    auth,
                    tokens,
                },
                ids,
            )
        }

        fn token(&self, name: &str) -> Option<&str> {
            self.tokens.get(name).map(String::as_str)
        }

        async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                req = req.header(AUTH_HEADER, token);
            }
            let body = match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            };
            let response = self.router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (h, _) = Harness::with_users(&[]).await;
        let (status, body) = h.send(Method::GET, "/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let (h, _) = Harness::with_users(&["ana"]).await;
        let (status, body) = h.send(Method::GET, "/v1/groups", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("Auth-Token"));

        let (status, _) = h.send(Method::GET, "/v1/groups", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_group_makes_creator_admin() {
        let (h, ids) = Harness::with_users(&["ana"]).await;
        let (status, group) = h
            .send(Method::POST, "/v1/groups", h.token("ana"), Some(json!({"name": "crew"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let gid = group["id"].as_str().unwrap().to_string();

        let (status, detail) = h
            .send(Method::GET, &format!("/v1/groups/{gid}/users"), h.token("ana"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["group"]["name"], "crew");
        assert_eq!(detail["users"][0]["user_id"], ids[0].to_hex());
        assert_eq!(detail["users"][0]["admin"], true);

        let (status, body) = h
            .send(Method::POST, "/v1/groups", h.token("ana"), Some(json!({"name": "crew"})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "groups document already exists");
    }

    #[tokio::test]
    async fn only_group_admins_manage_members() {
        let (h, ids) = Harness::with_users(&["ana", "bo"]).await;
        let (_, group) = h
            .send(Method::POST, "/v1/groups", h.token("ana"), Some(json!({"name": "crew"})))
            .await;
        let gid = group["id"].as_str().unwrap().to_string();
        let bo = ids[1].to_hex();

        let uri = format!("/v1/groups/{gid}/users/{bo}");
        let (status, _) = h.send(Method::POST, &uri, h.token("bo"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, membership) = h.send(Method::POST, &uri, h.token("ana"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(membership["admin"], false);

        let (status, _) = h.send(Method::POST, &uri, h.token("ana"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = h.send(Method::DELETE, &uri, h.token("ana"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn patch_group_is_accepted() {
        let (h, _) = Harness::with_users(&["ana"]).await;
        let (_, group) = h
            .send(Method::POST, "/v1/groups", h.token("ana"), Some(json!({"name": "crew"})))
            .await;
        let gid = group["id"].as_str().unwrap().to_string();
        let (status, updated) = h
            .send(
                Method::PATCH,
                &format!("/v1/groups/{gid}"),
                h.token("ana"),
                Some(json!({"description": "night shift"})),
            )
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(updated["name"], "crew");
        assert_eq!(updated["description"], "night shift");
    }

    #[tokio::test]
    async fn message_to_unknown_receiver_is_unprocessable() {
        let (h, _) = Harness::with_users(&["ana"]).await;
        let stranger = EntityId::generate().to_hex();
        let (status, body) = h
            .send(
                Method::POST,
                "/v1/messages",
                h.token("ana"),
                Some(json!({"receiver_id": stranger, "content": "hi"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "invalid receiver id");
    }

    #[tokio::test]
    async fn messages_list_for_receiver() {
        let (h, ids) = Harness::with_users(&["ana", "bo"]).await;
        let (status, _) = h
            .send(
                Method::POST,
                "/v1/messages",
                h.token("ana"),
                Some(json!({"receiver_id": ids[1].to_hex(), "content": "hi bo"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, inbox) = h.send(Method::GET, "/v1/messages", h.token("bo"), None).await;
        assert_eq!(inbox["messages"].as_array().unwrap().len(), 1);
        assert_eq!(inbox["messages"][0]["sender_id"], ids[0].to_hex());

        let (_, empty) = h.send(Method::GET, "/v1/messages", h.token("ana"), None).await;
        assert!(empty["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let (h, _) = Harness::with_users(&[]).await;
        let (status, created) = h
            .send(
                Method::POST,
                "/v1/users",
                None,
                Some(json!({
                    "username": "cy",
                    "email": "cy@example.com",
                    "password": "s3cret",
                    "phone": "555-0199"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created["user"].get("password").is_none());

        let (status, signed_in) = h
            .send(
                Method::POST,
                "/v1/auth",
                None,
                Some(json!({"email": "cy@example.com", "password": "s3cret"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(signed_in["user"]["username"], "cy");
        assert!(signed_in["user"].get("password").is_none());

        let token = signed_in["token"].as_str().unwrap();
        let claims = h.auth.verify(token).unwrap();
        assert_eq!(claims.id, created["user"]["id"].as_str().unwrap());
        assert!(!claims.root);
        let (status, _) = h.send(Method::GET, "/v1/groups", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = h
            .send(
                Method::POST,
                "/v1/auth",
                None,
                Some(json!({"email": "cy@example.com", "password": "wrong"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(h.services.users.find_all(&User::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_input_is_bad_request() {
        let (h, _) = Harness::with_users(&["ana"]).await;
        let (status, body) = h.send(Method::GET, "/v1/groups/not-hex", h.token("ana"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "bad request: missing group id");

        let (status, _) = h
            .send(
                Method::GET,
                "/v1/groups/000000000000000000000000",
                h.token("ana"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/v1/groups")
            .header(AUTH_HEADER, h.token("ana").unwrap())
            .body(Body::from("{not json"))
            .unwrap();
        let response = h.router.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn contacts_and_conversations_are_scoped_to_caller() {
        let (h, ids) = Harness::with_users(&["ana", "bo", "cy"]).await;
        let (status, _) = h
            .send(
                Method::POST,
                "/v1/contacts",
                h.token("ana"),
                Some(json!({"recipient_id": ids[1].to_hex(), "status": "pending"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = h
            .send(
                Method::POST,
                "/v1/conversations",
                h.token("ana"),
                Some(json!({"participants_ids": [ids[1].to_hex()]})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, bo_contacts) = h.send(Method::GET, "/v1/contacts", h.token("bo"), None).await;
        assert_eq!(bo_contacts["contacts"].as_array().unwrap().len(), 1);
        let (_, cy_contacts) = h.send(Method::GET, "/v1/contacts", h.token("cy"), None).await;
        assert!(cy_contacts["contacts"].as_array().unwrap().is_empty());

        let (_, ana_convos) = h.send(Method::GET, "/v1/conversations", h.token("ana"), None).await;
        assert_eq!(ana_convos["conversations"].as_array().unwrap().len(), 1);
        let (_, cy_convos) = h.send(Method::GET, "/v1/conversations", h.token("cy"), None).await;
        assert!(cy_convos["conversations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn spliced_token_is_rejected() {
        let (h, ids) = Harness::with_users(&["ana"]).await;
        let root = h.auth.issue(&Identity::root(ids[0])).unwrap();
        let ana: Vec<&str> = h.token("ana").unwrap().split('.').collect();
        let root: Vec<&str> = root.split('.').collect();
        let spliced = format!("{}.{}.{}", ana[0], root[1], ana[2]);

        let (status, body) = h.send(Method::GET, "/v1/groups", Some(spliced.as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "authentication failed: invalid token");

        let foreign = TokenAuth::new("someone-else", Duration::from_secs(600))
            .unwrap()
            .issue(&Identity::root(ids[0]))
            .unwrap();
        let (status, _) = h.send(Method::GET, "/v1/groups", Some(foreign.as_str()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn group_messages_are_visible_to_members_only() {
        let (h, ids) = Harness::with_users(&["ana", "bo", "cy"]).await;
        let (_, group) = h
            .send(Method::POST, "/v1/groups", h.token("ana"), Some(json!({"name": "crew"})))
            .await;
        let gid = group["id"].as_str().unwrap().to_string();
        let (status, _) = h
            .send(
                Method::POST,
                &format!("/v1/groups/{gid}/users/{}", ids[1].to_hex()),
                h.token("ana"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, msg) = h
            .send(
                Method::POST,
                "/v1/messages",
                h.token("ana"),
                Some(json!({"receiver_id": gid, "group": true, "content": "standup at nine"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/v1/messages/{}", msg["id"].as_str().unwrap());

        let (status, read) = h.send(Method::GET, &uri, h.token("bo"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["content"], "standup at nine");

        let (status, _) = h.send(Method::GET, &uri, h.token("cy"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn contact_items_are_limited_to_both_parties() {
        let (h, ids) = Harness::with_users(&["ana", "bo", "cy"]).await;
        let (_, contact) = h
            .send(
                Method::POST,
                "/v1/contacts",
                h.token("ana"),
                Some(json!({"recipient_id": ids[1].to_hex(), "status": "pending"})),
            )
            .await;
        let uri = format!("/v1/contacts/{}", contact["id"].as_str().unwrap());

        let (status, seen) = h.send(Method::GET, &uri, h.token("bo"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(seen["requester_id"], ids[0].to_hex());
        let (status, _) = h.send(Method::GET, &uri, h.token("cy"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let approve = Some(json!({"status": "approved"}));
        let (status, _) = h.send(Method::PATCH, &uri, h.token("ana"), approve.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, updated) = h.send(Method::PATCH, &uri, h.token("bo"), approve).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(updated["status"], "approved");

        let (status, _) = h.send(Method::DELETE, &uri, h.token("cy"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = h.send(Method::DELETE, &uri, h.token("bo"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = h.send(Method::GET, &uri, h.token("ana"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn conversation_items_are_limited_to_participants() {
        let (h, ids) = Harness::with_users(&["ana", "bo", "cy"]).await;
        let (_, convo) = h
            .send(
                Method::POST,
                "/v1/conversations",
                h.token("ana"),
                Some(json!({"participants_ids": [ids[1].to_hex()]})),
            )
            .await;
        let uri = format!("/v1/conversations/{}", convo["id"].as_str().unwrap());

        let (status, seen) = h.send(Method::GET, &uri, h.token("bo"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(seen["participants_ids"].as_array().unwrap().len(), 2);
        let (status, _) = h.send(Method::GET, &uri, h.token("cy"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = h.send(Method::DELETE, &uri, h.token("cy"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = h.send(Method::DELETE, &uri, h.token("bo"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = h.send(Method::GET, &uri, h.token("ana"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn group_conversation_admits_group_members() {
        let (h, ids) = Harness::with_users(&["ana", "bo", "cy"]).await;
        let (_, group) = h
            .send(Method::POST, "/v1/groups", h.token("ana"), Some(json!({"name": "crew"})))
            .await;
        let gid = group["id"].as_str().unwrap().to_string();
        h.send(
            Method::POST,
            &format!("/v1/groups/{gid}/users/{}", ids[1].to_hex()),
            h.token("ana"),
            None,
        )
        .await;

        let (status, convo) = h
            .send(
                Method::POST,
                "/v1/conversations",
                h.token("ana"),
                Some(json!({"participants_ids": [gid], "group": true})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/v1/conversations/{}", convo["id"].as_str().unwrap());

        let (status, _) = h.send(Method::GET, &uri, h.token("bo"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = h.send(Method::GET, &uri, h.token("cy"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
