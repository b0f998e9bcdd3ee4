//! Product Repository

use super::RepoResult;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use chrono::Utc;
use shared::util::slugify;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find all active products, featured first
    pub async fn find_all_active(&self) -> RepoResult<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE is_active = 1 ORDER BY is_featured DESC, name",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Find every product, including deactivated ones (admin view)
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
    }

    /// Check for a duplicate slug, optionally excluding one product id
    pub async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> RepoResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE slug = ? AND id != COALESCE(?, -1)",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Check for a duplicate SKU, optionally excluding one product id
    pub async fn sku_exists(&self, sku: &str, exclude_id: Option<i64>) -> RepoResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE sku = ? AND id != COALESCE(?, -1)",
        )
        .bind(sku)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Create a product together with its inventory row
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let now = Utc::now();
        let slug = data
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&data.name));

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO products (name, slug, sku, price, old_price, brand, is_active, is_featured, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?, ?)",
        )
        .bind(&data.name)
        .bind(&slug)
        .bind(&data.sku)
        .bind(data.price)
        .bind(data.old_price)
        .bind(&data.brand)
        .bind(data.is_featured.unwrap_or(false))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        sqlx::query(
            "INSERT INTO inventory (product_id, quantity, reserved_quantity, updated_at) VALUES (?, ?, 0, ?)",
        )
        .bind(id)
        .bind(data.initial_quantity.unwrap_or(0))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let created = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Apply a partial update and return the fresh row
    pub async fn update(&self, id: i64, data: ProductUpdate) -> RepoResult<Option<Product>> {
        let updated = sqlx::query(
            "UPDATE products SET \
               name = COALESCE(?, name), \
               slug = COALESCE(?, slug), \
               sku = COALESCE(?, sku), \
               price = COALESCE(?, price), \
               old_price = COALESCE(?, old_price), \
               brand = COALESCE(?, brand), \
               is_active = COALESCE(?, is_active), \
               is_featured = COALESCE(?, is_featured), \
               updated_at = ? \
             WHERE id = ?",
        )
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.sku)
        .bind(data.price)
        .bind(data.old_price)
        .bind(&data.brand)
        .bind(data.is_active)
        .bind(data.is_featured)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// True if any order item references this product
    pub async fn has_order_history(&self, id: i64) -> RepoResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Soft-deactivate a product (keeps order snapshots meaningful)
    pub async fn deactivate(&self, id: i64) -> RepoResult<bool> {
        let updated = sqlx::query("UPDATE products SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(updated.rows_affected() > 0)
    }

    /// Hard-delete a product and its inventory row
    pub async fn delete(&self, id: i64) -> RepoResult<bool> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }
}
