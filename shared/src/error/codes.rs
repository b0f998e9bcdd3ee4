//! Unified error codes for the MotoStore backend
//!
//! This module defines all error codes used across the store server and
//! frontend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 7xxx: Inventory errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Cannot delete admin user
    CannotDeleteAdmin = 2005,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// One or more cart items exceed available stock
    InsufficientStock = 4002,
    /// Status transition not permitted by the order lifecycle
    InvalidStatusTransition = 4003,
    /// Cart contains no items
    EmptyCart = 4004,
    /// Could not allocate a unique order number
    OrderNumberExhausted = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment status value not recognized
    InvalidPaymentStatus = 5001,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product slug already exists
    ProductSlugExists = 6002,
    /// Product SKU already exists
    ProductSkuExists = 6003,
    /// Product is not active
    ProductInactive = 6004,

    // ==================== 7xxx: Inventory ====================
    /// Inventory record not found
    InventoryNotFound = 7001,
    /// Requested quantity is below the reserved quantity
    QuantityBelowReserved = 7002,

    // ==================== 8xxx: User ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Email already exists
    EmailExists = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            Self::NotAuthenticated => "Authentication required",
            Self::InvalidCredentials => "Invalid credentials",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Invalid token",
            Self::AccountDisabled => "Account is disabled",

            Self::PermissionDenied => "Permission denied",
            Self::AdminRequired => "Admin role required",
            Self::CannotDeleteAdmin => "Admin users cannot be deleted",

            Self::OrderNotFound => "Order not found",
            Self::InsufficientStock => "Insufficient stock for one or more items",
            Self::InvalidStatusTransition => "Order status transition not permitted",
            Self::EmptyCart => "Cart contains no items",
            Self::OrderNumberExhausted => "Could not allocate a unique order number",

            Self::InvalidPaymentStatus => "Invalid payment status",

            Self::ProductNotFound => "Product not found",
            Self::ProductSlugExists => "Product slug already exists",
            Self::ProductSkuExists => "Product SKU already exists",
            Self::ProductInactive => "Product is not active",

            Self::InventoryNotFound => "Inventory record not found",
            Self::QuantityBelowReserved => "Quantity is below the reserved quantity",

            Self::UserNotFound => "User not found",
            Self::UsernameExists => "Username already exists",
            Self::EmailExists => "Email already exists",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            1007 => Self::AccountDisabled,

            2001 => Self::PermissionDenied,
            2003 => Self::AdminRequired,
            2005 => Self::CannotDeleteAdmin,

            4001 => Self::OrderNotFound,
            4002 => Self::InsufficientStock,
            4003 => Self::InvalidStatusTransition,
            4004 => Self::EmptyCart,
            4005 => Self::OrderNumberExhausted,

            5001 => Self::InvalidPaymentStatus,

            6001 => Self::ProductNotFound,
            6002 => Self::ProductSlugExists,
            6003 => Self::ProductSkuExists,
            6004 => Self::ProductInactive,

            7001 => Self::InventoryNotFound,
            7002 => Self::QuantityBelowReserved,

            8001 => Self::UserNotFound,
            8002 => Self::UsernameExists,
            8003 => Self::EmailExists,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::InsufficientStock,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::QuantityBelowReserved,
            ErrorCode::DatabaseError,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw), Ok(code));
        }
    }

    #[test]
    fn unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn display_is_padded() {
        assert_eq!(ErrorCode::ValidationFailed.to_string(), "E0002");
        assert_eq!(ErrorCode::InsufficientStock.to_string(), "E4002");
    }
}
