//! Audit Log API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Audit router - `audit:view` required
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/audit", get(handler::query))
        .route("/api/audit/verify", get(handler::verify))
}
