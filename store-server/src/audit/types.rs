//! 审计日志类型定义
//!
//! 所有条目不可变、不可删除，SHA256 哈希链防篡改。
//! 每个写操作都带显式操作者，不依赖任何会话级环境状态。

use serde::{Deserialize, Serialize};

/// 审计操作类型（枚举，非自由文本）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ 系统生命周期 ═══
    /// 系统正常启动
    SystemStartup,
    /// 系统正常关闭
    SystemShutdown,

    // ═══ 订单（财务关键）═══
    /// 订单创建（含库存预留）
    OrderPlaced,
    /// 订单状态流转
    OrderStatusChanged,

    // ═══ 目录与库存 ═══
    /// 商品创建
    ProductCreated,
    /// 商品更新
    ProductUpdated,
    /// 商品删除/下架
    ProductDeleted,
    /// 实物库存调整
    InventoryAdjusted,

    // ═══ 用户管理 ═══
    /// 用户创建
    UserCreated,
    /// 用户更新
    UserUpdated,
    /// 用户删除
    UserDeleted,
}

impl AuditAction {
    /// Stable string form (stored column value)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemStartup => "system_startup",
            Self::SystemShutdown => "system_shutdown",
            Self::OrderPlaced => "order_placed",
            Self::OrderStatusChanged => "order_status_changed",
            Self::ProductCreated => "product_created",
            Self::ProductUpdated => "product_updated",
            Self::ProductDeleted => "product_deleted",
            Self::InventoryAdjusted => "inventory_adjusted",
            Self::UserCreated => "user_created",
            Self::UserUpdated => "user_updated",
            Self::UserDeleted => "user_deleted",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审计日志条目（不可变）
///
/// - `prev_hash`: 前一条记录的哈希
/// - `curr_hash`: 当前记录的哈希（覆盖 prev_hash + 所有字段）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// 全局递增序列号（唯一标识）
    pub sequence: i64,
    /// 时间戳（Unix 毫秒）
    pub timestamp: i64,
    /// 操作类型
    pub action: String,
    /// 资源类型（order / product / inventory / user / system）
    pub resource_type: String,
    /// 资源 ID
    pub resource_id: String,
    /// 操作者 ID（显式传入）
    pub actor_id: Option<String>,
    /// 操作者名称快照
    pub actor_name: Option<String>,
    /// 附加详情
    pub details: serde_json::Value,
    /// 前一条记录哈希
    pub prev_hash: String,
    /// 当前记录哈希
    pub curr_hash: String,
}

/// 审计日志查询条件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub actor_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// 链验证结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerification {
    pub valid: bool,
    pub entries_checked: u64,
    /// 第一条被篡改记录的序列号（如有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_broken_sequence: Option<i64>,
}
