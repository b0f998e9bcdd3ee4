//! Inventory Repository

use super::RepoResult;
use crate::db::models::{InventoryLevel, InventoryOverview};
use chrono::Utc;
use sqlx::SqlitePool;

/// Outcome of a guarded quantity update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetQuantityOutcome {
    Updated,
    /// The new quantity would undercut the current reservation
    BelowReserved,
    NotFound,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Admin overview: counters joined with catalog identity
    pub async fn list_overview(&self) -> RepoResult<Vec<InventoryOverview>> {
        sqlx::query_as::<_, InventoryOverview>(
            "SELECT i.product_id, p.name AS product_name, p.sku, \
                    i.quantity, i.reserved_quantity, \
                    i.quantity - i.reserved_quantity AS available \
             FROM inventory i JOIN products p ON p.id = i.product_id \
             ORDER BY p.name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_product(&self, product_id: i64) -> RepoResult<Option<InventoryLevel>> {
        sqlx::query_as::<_, InventoryLevel>("SELECT * FROM inventory WHERE product_id = ?")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Set the physical quantity, guarded against undercutting the current
    /// reservation. The predicate runs atomically with the write.
    pub async fn set_quantity(
        &self,
        product_id: i64,
        quantity: i64,
    ) -> RepoResult<SetQuantityOutcome> {
        let updated = sqlx::query(
            "UPDATE inventory SET quantity = ?, updated_at = ? \
             WHERE product_id = ? AND reserved_quantity <= ?",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() > 0 {
            return Ok(SetQuantityOutcome::Updated);
        }

        // Distinguish a missing row from a reservation conflict
        match self.find_by_product(product_id).await? {
            Some(_) => Ok(SetQuantityOutcome::BelowReserved),
            None => Ok(SetQuantityOutcome::NotFound),
        }
    }
}
