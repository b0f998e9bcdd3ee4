//! Order API Module
//!
//! Checkout, status transitions, and read access. All inventory side
//! effects run through the transactional engines in [`crate::orders`].

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router - 全部路由需要登录
pub fn router() -> Router<ServerState> {
    Router::new()
        // Checkout (any authenticated customer)
        .route("/api/orders", post(handler::place))
        // Admin listing
        .route("/api/orders", get(handler::list))
        // Order detail (owner or admin)
        .route("/api/orders/{id}", get(handler::get_by_id))
        // Status transition (admin)
        .route("/api/orders/{id}/status", put(handler::update_status))
}
