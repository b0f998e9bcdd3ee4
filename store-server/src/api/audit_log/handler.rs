//! Audit Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::audit::{AuditEntry, AuditQuery, ChainVerification};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use shared::error::AppResult;

/// GET /api/audit - 查询审计日志（倒序）
pub async fn query(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    user.require("audit:view")?;

    let entries = state.audit.query(&query).await?;
    Ok(Json(entries))
}

/// GET /api/audit/verify - 验证哈希链完整性
pub async fn verify(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ChainVerification>> {
    user.require("audit:view")?;

    let verification = state.audit.verify_chain().await?;
    Ok(Json(verification))
}
