//! Shared types for the MotoStore storefront
//!
//! Common types used by the store server and its clients: the unified
//! error system, API response structures, the storefront wire contract
//! for order placement, and small utilities.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use response::{Paginated, Pagination};
