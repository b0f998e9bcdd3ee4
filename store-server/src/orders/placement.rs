//! Order placement
//!
//! Creates an order inside a single database transaction: availability
//! check with a combined shortage report, name/price snapshots into the
//! line items, guarded inventory reservation, and the final total.
//!
//! 预检查汇总所有缺货行；预留用条件更新原子复核库存，
//! 并发下单不可能联合超订。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{InsufficientItem, PlaceOrderRequest};
use sqlx::SqlitePool;
use thiserror::Error;

use super::{money, number};

/// Placement failure modes
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Every short line, reported together - not fail-fast
    #[error("insufficient stock for {} item(s)", .0.len())]
    InsufficientStock(Vec<InsufficientItem>),

    /// Cart references products that do not exist or are deactivated
    #[error("unknown or inactive product(s): {0:?}")]
    UnknownProducts(Vec<i64>),

    /// Payload rejected before the transaction started
    #[error(transparent)]
    Invalid(AppError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<PlacementError> for AppError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::InsufficientStock(items) => {
                AppError::new(ErrorCode::InsufficientStock).with_detail("items", json!(items))
            }
            PlacementError::UnknownProducts(ids) => {
                AppError::with_message(ErrorCode::ProductNotFound, "Some products are unavailable")
                    .with_detail("productIds", json!(ids))
            }
            PlacementError::Invalid(e) => e,
            PlacementError::Db(e) => e.into(),
        }
    }
}

/// Successful placement result
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: i64,
    pub order_number: String,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Product fields read inside the transaction - the snapshot source
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    name: String,
    price: f64,
    is_active: bool,
    quantity: i64,
    reserved_quantity: i64,
}

/// Place an order for `user_id`
///
/// All-or-nothing: any failure after the transaction opens rolls back the
/// order header, every line item, and every reservation.
pub async fn place_order(
    pool: &SqlitePool,
    user_id: Option<i64>,
    req: &PlaceOrderRequest,
) -> Result<PlacedOrder, PlacementError> {
    if req.cart_items.is_empty() {
        return Err(PlacementError::Invalid(AppError::new(ErrorCode::EmptyCart)));
    }
    for item in &req.cart_items {
        money::validate_cart_item(item).map_err(PlacementError::Invalid)?;
    }

    // Aggregate duplicate lines per product so the availability check sees
    // the cart's full demand. BTreeMap keeps the read order deterministic.
    let mut requested: BTreeMap<i64, i64> = BTreeMap::new();
    for item in &req.cart_items {
        *requested.entry(item.id).or_insert(0) += item.quantity;
    }

    let mut tx = pool.begin().await?;

    // 1. Availability pass - collect every shortage before giving up
    let mut snapshots: BTreeMap<i64, StockRow> = BTreeMap::new();
    let mut missing: Vec<i64> = Vec::new();
    let mut shortages: Vec<InsufficientItem> = Vec::new();

    for (&product_id, &quantity) in &requested {
        let row = sqlx::query_as::<_, StockRow>(
            "SELECT p.name, p.price, p.is_active, \
                    COALESCE(i.quantity, 0) AS quantity, \
                    COALESCE(i.reserved_quantity, 0) AS reserved_quantity \
             FROM products p \
             LEFT JOIN inventory i ON i.product_id = p.id \
             WHERE p.id = ?",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            None => missing.push(product_id),
            Some(row) if !row.is_active => missing.push(product_id),
            Some(row) => {
                let available = row.quantity - row.reserved_quantity;
                if quantity > available {
                    shortages.push(InsufficientItem {
                        product_id,
                        requested: quantity,
                        available: available.max(0),
                    });
                } else {
                    snapshots.insert(product_id, row);
                }
            }
        }
    }

    if !missing.is_empty() {
        return Err(PlacementError::UnknownProducts(missing));
    }
    if !shortages.is_empty() {
        return Err(PlacementError::InsufficientStock(shortages));
    }

    // 2. Order header with a placeholder total
    let order_number = number::unique_order_number(&mut tx)
        .await
        .map_err(PlacementError::Invalid)?;
    let now = Utc::now();
    let form = &req.form_data;

    let result = sqlx::query(
        "INSERT INTO orders (order_number, user_id, status, payment_status, total_amount, \
                             first_name, last_name, email, phone, address, city, postal_code, \
                             payment_method, notes, created_at, updated_at) \
         VALUES (?, ?, 'pending', 'pending', 0, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order_number)
    .bind(user_id)
    .bind(&form.first_name)
    .bind(&form.last_name)
    .bind(&form.email)
    .bind(&form.phone)
    .bind(&form.address)
    .bind(&form.city)
    .bind(&form.postal_code)
    .bind(&form.payment_method)
    .bind(&form.comments)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let order_id = result.last_insert_rowid();

    // 3. Snapshot line items and reserve stock
    let mut total = Decimal::ZERO;
    for item in &req.cart_items {
        // Checked above: every cart product has a snapshot by now
        let Some(snapshot) = snapshots.get(&item.id) else {
            return Err(PlacementError::UnknownProducts(vec![item.id]));
        };

        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, product_name, quantity, price) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(item.id)
        .bind(&snapshot.name)
        .bind(item.quantity)
        .bind(snapshot.price)
        .execute(&mut *tx)
        .await?;

        // Guarded reservation: the availability predicate is re-evaluated
        // atomically with the increment, so a concurrent order that won the
        // stock makes this affect zero rows instead of over-reserving.
        let reserved = sqlx::query(
            "UPDATE inventory \
             SET reserved_quantity = reserved_quantity + ?, updated_at = ? \
             WHERE product_id = ? AND quantity - reserved_quantity >= ?",
        )
        .bind(item.quantity)
        .bind(now)
        .bind(item.id)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            let available: i64 = sqlx::query_scalar(
                "SELECT quantity - reserved_quantity FROM inventory WHERE product_id = ?",
            )
            .bind(item.id)
            .fetch_optional(&mut *tx)
            .await?
            .unwrap_or(0);

            return Err(PlacementError::InsufficientStock(vec![InsufficientItem {
                product_id: item.id,
                requested: item.quantity,
                available: available.max(0),
            }]));
        }

        total += money::line_total(snapshot.price, item.quantity).map_err(PlacementError::Invalid)?;
    }

    // 4. Final total, computed from the snapshots just written
    let total_amount = money::round_to_currency(total);
    sqlx::query("UPDATE orders SET total_amount = ?, updated_at = ? WHERE id = ?")
        .bind(total_amount)
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        order_id,
        order_number = %order_number,
        total_amount,
        items = req.cart_items.len(),
        "Order placed"
    );

    Ok(PlacedOrder {
        order_id,
        order_number,
        total_amount,
        created_at: now,
    })
}
