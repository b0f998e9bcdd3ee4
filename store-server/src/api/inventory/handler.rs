//! Inventory API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{InventoryLevel, InventoryOverview};
use crate::db::repository::InventoryRepository;
use crate::db::repository::inventory::SetQuantityOutcome;
use shared::error::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "inventory";

/// GET /api/inventory - 库存总览
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<InventoryOverview>>> {
    user.require("inventory:manage")?;

    let repo = InventoryRepository::new(state.pool().clone());
    let overview = repo.list_overview().await?;
    Ok(Json(overview))
}

/// GET /api/inventory/:product_id - 单个商品库存
pub async fn get_by_product(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<i64>,
) -> AppResult<Json<InventoryLevel>> {
    user.require("inventory:manage")?;

    let repo = InventoryRepository::new(state.pool().clone());
    let level = repo.find_by_product(product_id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::InventoryNotFound,
            format!("No inventory record for product {product_id}"),
        )
    })?;
    Ok(Json(level))
}

/// Payload for a physical-stock adjustment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// PUT /api/inventory/:product_id - 调整实物库存
///
/// 新数量不得低于当前预留量（否则会打破 `reserved <= quantity` 不变量）。
pub async fn set_quantity(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<i64>,
    Json(payload): Json<SetQuantityRequest>,
) -> AppResult<Json<InventoryLevel>> {
    user.require("inventory:manage")?;

    if payload.quantity < 0 {
        return Err(AppError::validation("quantity must not be negative"));
    }

    let repo = InventoryRepository::new(state.pool().clone());
    match repo.set_quantity(product_id, payload.quantity).await? {
        SetQuantityOutcome::Updated => {}
        SetQuantityOutcome::BelowReserved => {
            return Err(AppError::with_message(
                ErrorCode::QuantityBelowReserved,
                "New quantity is below the currently reserved quantity",
            ));
        }
        SetQuantityOutcome::NotFound => {
            return Err(AppError::with_message(
                ErrorCode::InventoryNotFound,
                format!("No inventory record for product {product_id}"),
            ));
        }
    }

    state.audit.log(
        AuditAction::InventoryAdjusted,
        RESOURCE,
        product_id,
        Some(&user),
        json!({ "quantity": payload.quantity }),
    );

    let level = repo.find_by_product(product_id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::InventoryNotFound,
            format!("No inventory record for product {product_id}"),
        )
    })?;
    Ok(Json(level))
}
