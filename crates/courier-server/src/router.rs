use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Courier endpoints.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health))
        .route("/v1/auth", post(handler::sign_in))
        .route("/v1/users", post(handler::create_user))
        .route("/v1/users/:id", get(handler::show_user))
        .route("/v1/groups", get(handler::list_groups).post(handler::create_group))
        .route(
            "/v1/groups/:id",
            get(handler::show_group)
                .patch(handler::modify_group)
                .delete(handler::delete_group),
        )
        .route("/v1/groups/:id/users", get(handler::group_users))
        .route(
            "/v1/groups/:id/users/:user_id",
            post(handler::add_group_user).delete(handler::remove_group_user),
        )
        .route("/v1/messages", get(handler::list_messages).post(handler::create_message))
        .route(
            "/v1/messages/:id",
            get(handler::show_message).delete(handler::delete_message),
        )
        .route(
            "/v1/conversations",
            get(handler::list_conversations).post(handler::create_conversation),
        )
        .route(
            "/v1/conversations/:id",
            get(handler::show_conversation).delete(handler::delete_conversation),
        )
        .route("/v1/contacts", get(handler::list_contacts).post(handler::create_contact))
        .route(
            "/v1/contacts/:id",
            get(handler::show_contact)
                .patch(handler::modify_contact)
                .delete(handler::delete_contact),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
