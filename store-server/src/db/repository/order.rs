//! Order Repository
//!
//! Read-side access to orders. All mutations go through
//! [`crate::orders::placement`] and [`crate::orders::transition`].

use super::RepoResult;
use crate::db::models::{Order, OrderDetail, OrderItem};
use shared::models::OrderStatus;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// One page of orders, newest first, optionally filtered by status
    pub async fn find_page(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Order>> {
        sqlx::query_as::<_, Order>(
            "SELECT * FROM orders \
             WHERE status = COALESCE(?, status) \
             ORDER BY created_at DESC, id DESC \
             LIMIT ? OFFSET ?",
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Total order count for the same filter
    pub async fn count(&self, status: Option<OrderStatus>) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = COALESCE(?, status)")
            .bind(status)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_items(&self, order_id: i64) -> RepoResult<Vec<OrderItem>> {
        sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ? ORDER BY id")
            .bind(order_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Header plus line items
    pub async fn find_detail(&self, id: i64) -> RepoResult<Option<OrderDetail>> {
        let Some(order) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.find_items(id).await?;
        Ok(Some(OrderDetail { order, items }))
    }

    pub async fn number_exists(&self, order_number: &str) -> RepoResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_number = ?")
            .bind(order_number)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
