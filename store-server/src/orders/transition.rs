//! Order status transitions
//!
//! A valid-transition table guards every lifecycle change, and the two
//! transitions with inventory side effects apply them in the same
//! transaction as the status write:
//!
//! - `cancelled` releases each item's reservation
//! - `delivered` deducts physical stock and releases the reservation
//!
//! Re-applying the current status is an inventory no-op, so cancelling
//! twice never double-releases and delivering twice never double-deducts.

use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, PaymentStatus};
use sqlx::SqlitePool;
use thiserror::Error;

/// Transition failure modes
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("order {0} not found")]
    NotFound(i64),

    #[error("transition {from} -> {to} is not permitted")]
    Invalid { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
            }
            TransitionError::Invalid { from, to } => AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot change order status from {from} to {to}"),
            )
            .with_detail("from", json!(from))
            .with_detail("to", json!(to)),
            TransitionError::Db(e) => e.into(),
        }
    }
}

/// Statuses reachable from `from` in one step
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Pending => &[Processing, Shipped, Delivered, Cancelled],
        Processing => &[Shipped, Delivered, Cancelled],
        Shipped => &[Delivered, Cancelled],
        // Terminal states
        Delivered => &[],
        Cancelled => &[],
    }
}

/// True when `from -> to` is permitted (same-status is always permitted)
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
    from == to || allowed_transitions(from).contains(&to)
}

/// Result of a status update
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub order_id: i64,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderHead {
    status: OrderStatus,
    payment_status: PaymentStatus,
}

/// Update an order's status (and optionally its payment status), applying
/// inventory side effects exactly once per transition
pub async fn update_status(
    pool: &SqlitePool,
    order_id: i64,
    new_status: OrderStatus,
    new_payment_status: Option<PaymentStatus>,
) -> Result<StatusChange, TransitionError> {
    let mut tx = pool.begin().await?;

    let head = sqlx::query_as::<_, OrderHead>(
        "SELECT status, payment_status FROM orders WHERE id = ?",
    )
    .bind(order_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(TransitionError::NotFound(order_id))?;

    let old_status = head.status;
    if !is_valid_transition(old_status, new_status) {
        return Err(TransitionError::Invalid {
            from: old_status,
            to: new_status,
        });
    }

    sqlx::query(
        "UPDATE orders SET status = ?, payment_status = COALESCE(?, payment_status), updated_at = ? \
         WHERE id = ?",
    )
    .bind(new_status)
    .bind(new_payment_status)
    .bind(chrono::Utc::now())
    .bind(order_id)
    .execute(&mut *tx)
    .await?;

    // Inventory effects only when the status actually changes
    if new_status != old_status {
        match new_status {
            OrderStatus::Cancelled => {
                // Release the hold. Floored at zero so a malformed history
                // can never drive the counter negative.
                sqlx::query(
                    "UPDATE inventory \
                     SET reserved_quantity = MAX(0, reserved_quantity - ( \
                           SELECT SUM(quantity) FROM order_items \
                           WHERE order_id = ? AND product_id = inventory.product_id)), \
                         updated_at = ? \
                     WHERE product_id IN (SELECT product_id FROM order_items WHERE order_id = ?)",
                )
                .bind(order_id)
                .bind(chrono::Utc::now())
                .bind(order_id)
                .execute(&mut *tx)
                .await?;
            }
            OrderStatus::Delivered => {
                // Fulfill: deduct physical stock and release the hold
                sqlx::query(
                    "UPDATE inventory \
                     SET quantity = MAX(0, quantity - ( \
                           SELECT SUM(quantity) FROM order_items \
                           WHERE order_id = ? AND product_id = inventory.product_id)), \
                         reserved_quantity = MAX(0, reserved_quantity - ( \
                           SELECT SUM(quantity) FROM order_items \
                           WHERE order_id = ? AND product_id = inventory.product_id)), \
                         updated_at = ? \
                     WHERE product_id IN (SELECT product_id FROM order_items WHERE order_id = ?)",
                )
                .bind(order_id)
                .bind(order_id)
                .bind(chrono::Utc::now())
                .bind(order_id)
                .execute(&mut *tx)
                .await?;
            }
            _ => {}
        }
    }

    tx.commit().await?;

    let change = StatusChange {
        order_id,
        old_status,
        new_status,
        payment_status: new_payment_status.unwrap_or(head.payment_status),
    };

    tracing::info!(
        order_id,
        from = %change.old_status,
        to = %change.new_status,
        "Order status updated"
    );

    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn same_status_is_always_permitted() {
        for s in [Pending, Processing, Shipped, Delivered, Cancelled] {
            assert!(is_valid_transition(s, s));
        }
    }

    #[test]
    fn terminal_states_allow_no_exit() {
        for to in [Pending, Processing, Shipped, Cancelled] {
            assert!(!is_valid_transition(Delivered, to));
        }
        for to in [Pending, Processing, Shipped, Delivered] {
            assert!(!is_valid_transition(Cancelled, to));
        }
    }

    #[test]
    fn delivery_after_cancellation_is_rejected() {
        assert!(!is_valid_transition(Cancelled, Delivered));
    }

    #[test]
    fn forward_flow_is_permitted() {
        assert!(is_valid_transition(Pending, Processing));
        assert!(is_valid_transition(Pending, Cancelled));
        assert!(is_valid_transition(Pending, Delivered));
        assert!(is_valid_transition(Processing, Shipped));
        assert!(is_valid_transition(Shipped, Delivered));
        assert!(is_valid_transition(Shipped, Cancelled));
    }

    #[test]
    fn no_reopening_orders() {
        assert!(!is_valid_transition(Processing, Pending));
        assert!(!is_valid_transition(Shipped, Processing));
    }
}
