//! Product API Module
//!
//! Catalog reads are public; mutations require `catalog:manage`.

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

/// Product router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(handler::list))
        .route("/api/products", post(handler::create))
        .route("/api/products/slug/{slug}", get(handler::get_by_slug))
        .route("/api/products/{id}", get(handler::get_by_id))
        .route("/api/products/{id}", put(handler::update))
        .route("/api/products/{id}", delete(handler::delete))
}
