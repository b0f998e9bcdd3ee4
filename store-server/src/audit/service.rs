//! 审计日志服务
//!
//! `AuditService` 是审计日志的入口：
//! - 日志写入（mpsc 通道 + 单一 writer 任务，保证序列号无竞争）
//! - 日志查询 / 链验证（直接读取存储层）
//!
//! 每条记录的操作者都由调用方显式传入（[`crate::auth::CurrentUser`]），
//! 取代原系统依赖的会话级环境变量。

use std::sync::Arc;

use tokio::sync::mpsc;

use super::storage::{AuditStorage, AuditStorageResult};
use super::types::{AuditAction, AuditEntry, AuditQuery, ChainVerification};
use crate::auth::CurrentUser;
use sqlx::SqlitePool;

/// 发送到 writer 任务的日志请求
#[derive(Debug)]
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub actor_id: Option<String>,
    pub actor_name: Option<String>,
    pub details: serde_json::Value,
}

/// 审计日志服务
pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService").finish_non_exhaustive()
    }
}

impl AuditService {
    /// 创建审计服务并启动 writer 任务
    pub fn start(pool: SqlitePool, buffer_size: usize) -> Arc<Self> {
        let (tx, mut rx) = mpsc::channel::<AuditLogRequest>(buffer_size);
        let storage = AuditStorage::new(pool);
        let service = Arc::new(Self {
            storage: storage.clone(),
            tx,
        });

        tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                if let Err(e) = storage
                    .append(
                        req.action,
                        &req.resource_type,
                        &req.resource_id,
                        req.actor_id,
                        req.actor_name,
                        req.details,
                    )
                    .await
                {
                    tracing::error!(error = %e, "Failed to append audit entry");
                }
            }
            tracing::debug!("Audit writer stopped");
        });

        service
    }

    /// 异步记录一条审计日志（fire-and-forget）
    pub fn log(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: impl ToString,
        actor: Option<&CurrentUser>,
        details: serde_json::Value,
    ) {
        let req = AuditLogRequest {
            action,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            actor_id: actor.map(|u| u.id.to_string()),
            actor_name: actor.map(|u| u.username.clone()),
            details,
        };
        if let Err(e) = self.tx.try_send(req) {
            tracing::warn!(error = %e, "Audit channel full, entry dropped");
        }
    }

    /// 系统启动记录（同步写入，确保启动事件不丢失）
    pub async fn on_startup(&self) {
        if let Err(e) = self
            .storage
            .append(
                AuditAction::SystemStartup,
                "system",
                "store-server",
                None,
                None,
                serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }),
            )
            .await
        {
            tracing::error!(error = %e, "Failed to record startup audit entry");
        }
    }

    /// 系统关闭记录（同步写入）
    pub async fn on_shutdown(&self) {
        if let Err(e) = self
            .storage
            .append(
                AuditAction::SystemShutdown,
                "system",
                "store-server",
                None,
                None,
                serde_json::json!({}),
            )
            .await
        {
            tracing::error!(error = %e, "Failed to record shutdown audit entry");
        }
    }

    /// 查询审计记录
    pub async fn query(&self, query: &AuditQuery) -> AuditStorageResult<Vec<AuditEntry>> {
        self.storage.query(query).await
    }

    /// 验证哈希链完整性
    pub async fn verify_chain(&self) -> AuditStorageResult<ChainVerification> {
        self.storage.verify_chain().await
    }
}
