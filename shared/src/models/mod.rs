//! Storefront wire contract
//!
//! Request/response payloads exchanged with the storefront client, plus the
//! order lifecycle enums shared between the API layer and persistence.

pub mod order;

pub use order::{
    CartItemRequest, InsufficientItem, OrderFormData, OrderStatus, PaymentStatus,
    PlaceOrderRequest, PlaceOrderResponse, StatusUpdateRequest, StatusUpdateResponse,
};
