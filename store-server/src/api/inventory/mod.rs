//! Inventory API Module
//!
//! Admin view and adjustment of stock counters. Reservations are owned by
//! the order engines and never mutated directly here.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// Inventory router - `inventory:manage` required
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/inventory", get(handler::list))
        .route("/api/inventory/{product_id}", get(handler::get_by_product))
        .route("/api/inventory/{product_id}", put(handler::set_quantity))
}
