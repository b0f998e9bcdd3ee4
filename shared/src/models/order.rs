//! Order lifecycle enums and the checkout wire contract

use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// Lifecycle enums
// ============================================================================

/// Order lifecycle state
///
/// Transitions are guarded server-side; only `cancelled` and `delivered`
/// have inventory side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created at checkout, stock reserved
    #[default]
    Pending,
    /// Accepted and being prepared
    Processing,
    /// Handed to the carrier
    Shipped,
    /// Fulfilled - stock deducted, reservation released
    Delivered,
    /// Abandoned - reservation released
    Cancelled,
}

impl OrderStatus {
    /// Stable string form (matches the stored column value)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// True for states that can never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state, tracked independently of the order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Checkout request
// ============================================================================

/// Shipping and payment details collected by the checkout form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderFormData {
    #[validate(length(min = 1, max = 100, message = "firstName is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "lastName is required"))]
    pub last_name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, max = 500, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 20, message = "postalCode is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 50, message = "paymentMethod is required"))]
    pub payment_method: String,
    /// Optional free-text note from the customer
    #[serde(default)]
    #[validate(length(max = 500, message = "comments is too long"))]
    pub comments: Option<String>,
}

/// One cart line as submitted by the storefront
///
/// `price` and `name` are client-side display values; the server snapshots
/// the authoritative name and price from the catalog at placement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    /// Product id
    pub id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /api/orders` request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[validate(nested)]
    pub form_data: OrderFormData,
    pub cart_items: Vec<CartItemRequest>,
    /// Client-computed display total; the server recomputes from snapshots
    #[serde(default)]
    pub total: Option<f64>,
}

// ============================================================================
// Checkout response
// ============================================================================

/// One line of the combined stock-shortage report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientItem {
    pub product_id: i64,
    pub requested: i64,
    pub available: i64,
}

/// `POST /api/orders` response body
///
/// Stock shortages are a business outcome, not a transport error: they are
/// returned with HTTP 200 and `success: false` plus the full shortage list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insufficient_items: Option<Vec<InsufficientItem>>,
}

impl PlaceOrderResponse {
    /// Successful placement
    pub fn placed(
        order_number: String,
        order_date: chrono::DateTime<chrono::Utc>,
        total: f64,
    ) -> Self {
        Self {
            success: true,
            order_number: Some(order_number),
            order_date: Some(order_date),
            total: Some(total),
            message: None,
            insufficient_items: None,
        }
    }

    /// Combined shortage report
    pub fn out_of_stock(items: Vec<InsufficientItem>) -> Self {
        Self {
            success: false,
            order_number: None,
            order_date: None,
            total: None,
            message: Some("Some items in your cart are no longer available".to_string()),
            insufficient_items: Some(items),
        }
    }
}

// ============================================================================
// Status update
// ============================================================================

/// `PUT /api/orders/:id/status` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

/// `PUT /api/orders/:id/status` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
        let back: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }

    #[test]
    fn terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn place_order_request_uses_camel_case() {
        let raw = r#"{
            "formData": {
                "firstName": "Ana", "lastName": "García", "email": "ana@example.com",
                "phone": "600123123", "address": "Calle Mayor 1", "city": "Madrid",
                "postalCode": "28001", "paymentMethod": "card"
            },
            "cartItems": [{"id": 7, "quantity": 2, "price": 159.0}],
            "total": 318.0
        }"#;
        let req: PlaceOrderRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.form_data.postal_code, "28001");
        assert_eq!(req.cart_items[0].id, 7);
        assert!(req.form_data.comments.is_none());
    }

    #[test]
    fn shortage_response_shape() {
        let resp = PlaceOrderResponse::out_of_stock(vec![InsufficientItem {
            product_id: 3,
            requested: 5,
            available: 1,
        }]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["insufficientItems"][0]["productId"], 3);
        assert!(json.get("orderNumber").is_none());
    }
}
