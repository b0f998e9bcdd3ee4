//! Inventory entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock counters for one product
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLevel {
    pub product_id: i64,
    /// Physical stock on hand
    pub quantity: i64,
    /// Held for pending orders, not yet shipped
    pub reserved_quantity: i64,
    pub updated_at: DateTime<Utc>,
}

impl InventoryLevel {
    /// Stock available to new orders
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved_quantity
    }
}

/// Admin overview row - counters joined with catalog identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOverview {
    pub product_id: i64,
    pub product_name: String,
    pub sku: String,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub available: i64,
}
