//! User Admin API Module

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

/// User admin router - `users:manage` required (admin only)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/users", get(handler::list))
        .route("/api/users", post(handler::create))
        .route("/api/users/{id}", get(handler::get_by_id))
        .route("/api/users/{id}", put(handler::update))
        .route("/api/users/{id}", delete(handler::delete))
}
