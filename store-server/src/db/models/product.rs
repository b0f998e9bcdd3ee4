//! Product entity and payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog product
///
/// `id`, `slug` and `sku` are identity; pricing and flags are mutable.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub price: f64,
    pub old_price: Option<f64>,
    pub brand: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    /// Derived from `name` when absent
    pub slug: Option<String>,
    pub sku: String,
    pub price: f64,
    pub old_price: Option<f64>,
    pub brand: Option<String>,
    pub is_featured: Option<bool>,
    /// Initial physical stock for the inventory row
    pub initial_quantity: Option<i64>,
}

/// Update product payload - only present fields are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub old_price: Option<f64>,
    pub brand: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}
