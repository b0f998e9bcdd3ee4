//! 审计日志 SQLite 存储层
//!
//! Append-only 设计，没有任何删除/更新接口。
//! SHA256 哈希链确保防篡改。

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;

use super::types::{AuditAction, AuditEntry, AuditQuery, ChainVerification};

/// 创世哈希（链的起点）
const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// 存储错误
#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

impl From<AuditStorageError> for shared::error::AppError {
    fn from(err: AuditStorageError) -> Self {
        shared::error::AppError::internal(err.to_string())
    }
}

/// 审计存储 - 唯一的写入方是单一 writer 任务，序列号因此无竞争
#[derive(Clone)]
pub struct AuditStorage {
    pool: SqlitePool,
}

impl AuditStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 计算一条记录的链哈希
    fn compute_hash(
        prev_hash: &str,
        sequence: i64,
        timestamp: i64,
        action: &str,
        resource_type: &str,
        resource_id: &str,
        actor_id: Option<&str>,
        details: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(prev_hash.as_bytes());
        hasher.update(sequence.to_be_bytes());
        hasher.update(timestamp.to_be_bytes());
        hasher.update(action.as_bytes());
        hasher.update(resource_type.as_bytes());
        hasher.update(resource_id.as_bytes());
        hasher.update(actor_id.unwrap_or("").as_bytes());
        hasher.update(details.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// 追加一条审计记录
    pub async fn append(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        actor_id: Option<String>,
        actor_name: Option<String>,
        details: serde_json::Value,
    ) -> AuditStorageResult<AuditEntry> {
        let (last_sequence, prev_hash) = self.chain_head().await?;
        let sequence = last_sequence + 1;
        let timestamp = shared::util::now_millis();
        let details_str = serde_json::to_string(&details)?;

        let curr_hash = Self::compute_hash(
            &prev_hash,
            sequence,
            timestamp,
            action.as_str(),
            resource_type,
            resource_id,
            actor_id.as_deref(),
            &details_str,
        );

        sqlx::query(
            "INSERT INTO audit_log (sequence, timestamp, action, resource_type, resource_id, \
                                    actor_id, actor_name, details, prev_hash, curr_hash) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(sequence)
        .bind(timestamp)
        .bind(action.as_str())
        .bind(resource_type)
        .bind(resource_id)
        .bind(&actor_id)
        .bind(&actor_name)
        .bind(&details_str)
        .bind(&prev_hash)
        .bind(&curr_hash)
        .execute(&self.pool)
        .await?;

        Ok(AuditEntry {
            sequence,
            timestamp,
            action: action.as_str().to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            actor_id,
            actor_name,
            details,
            prev_hash,
            curr_hash,
        })
    }

    /// 链头：最后一条记录的 (sequence, curr_hash)
    async fn chain_head(&self) -> AuditStorageResult<(i64, String)> {
        let head: Option<(i64, String)> = sqlx::query_as(
            "SELECT sequence, curr_hash FROM audit_log ORDER BY sequence DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(head.unwrap_or((0, GENESIS_HASH.to_string())))
    }

    /// 查询审计记录（倒序）
    pub async fn query(&self, query: &AuditQuery) -> AuditStorageResult<Vec<AuditEntry>> {
        let limit = query.limit.unwrap_or(50).clamp(1, 500);
        let offset = query.offset.unwrap_or(0).max(0);

        // actor_id 列可为 NULL，COALESCE 过滤会吞掉无操作者的行
        let rows: Vec<AuditRow> = sqlx::query_as(
            "SELECT * FROM audit_log \
             WHERE action = COALESCE(?, action) \
               AND resource_type = COALESCE(?, resource_type) \
               AND (? IS NULL OR actor_id = ?) \
             ORDER BY sequence DESC \
             LIMIT ? OFFSET ?",
        )
        .bind(&query.action)
        .bind(&query.resource_type)
        .bind(&query.actor_id)
        .bind(&query.actor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }

    /// 验证整条哈希链
    pub async fn verify_chain(&self) -> AuditStorageResult<ChainVerification> {
        let rows: Vec<AuditRow> =
            sqlx::query_as("SELECT * FROM audit_log ORDER BY sequence ASC")
                .fetch_all(&self.pool)
                .await?;

        let mut expected_prev = GENESIS_HASH.to_string();
        let mut checked: u64 = 0;

        for row in rows {
            let recomputed = Self::compute_hash(
                &row.prev_hash,
                row.sequence,
                row.timestamp,
                &row.action,
                &row.resource_type,
                &row.resource_id,
                row.actor_id.as_deref(),
                &row.details,
            );
            if row.prev_hash != expected_prev || recomputed != row.curr_hash {
                return Ok(ChainVerification {
                    valid: false,
                    entries_checked: checked,
                    first_broken_sequence: Some(row.sequence),
                });
            }
            expected_prev = row.curr_hash;
            checked += 1;
        }

        Ok(ChainVerification {
            valid: true,
            entries_checked: checked,
            first_broken_sequence: None,
        })
    }
}

/// SQLite 行（details 为 JSON 字符串）
#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    sequence: i64,
    timestamp: i64,
    action: String,
    resource_type: String,
    resource_id: String,
    actor_id: Option<String>,
    actor_name: Option<String>,
    details: String,
    prev_hash: String,
    curr_hash: String,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = AuditStorageError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(AuditEntry {
            sequence: row.sequence,
            timestamp: row.timestamp,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            actor_id: row.actor_id,
            actor_name: row.actor_name,
            details: serde_json::from_str(&row.details)?,
            prev_hash: row.prev_hash,
            curr_hash: row.curr_hash,
        })
    }
}
