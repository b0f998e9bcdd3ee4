//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderDetail};
use crate::db::repository::OrderRepository;
use crate::orders::{self, PlacementError};
use shared::error::{AppError, AppResult};
use shared::models::{
    OrderStatus, PlaceOrderRequest, PlaceOrderResponse, StatusUpdateRequest, StatusUpdateResponse,
};
use shared::response::Paginated;

const RESOURCE: &str = "order";

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// POST /api/orders - 下单
///
/// 缺货属于业务结果而非传输错误：返回 200 + `success:false` + 完整缺货清单。
pub async fn place(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<PlaceOrderResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    match orders::place_order(state.pool(), Some(user.id), &payload).await {
        Ok(placed) => {
            state.audit.log(
                AuditAction::OrderPlaced,
                RESOURCE,
                placed.order_id,
                Some(&user),
                json!({
                    "orderNumber": placed.order_number,
                    "totalAmount": placed.total_amount,
                    "items": payload.cart_items.len(),
                }),
            );

            Ok(Json(PlaceOrderResponse::placed(
                placed.order_number,
                placed.created_at,
                placed.total_amount,
            )))
        }
        Err(PlacementError::InsufficientStock(items)) => {
            Ok(Json(PlaceOrderResponse::out_of_stock(items)))
        }
        Err(other) => Err(other.into()),
    }
}

/// GET /api/orders - 订单列表（分页，可按状态过滤）
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<Order>>> {
    user.require("orders:manage")?;

    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);
    let offset = i64::from(page - 1) * i64::from(limit);

    let repo = OrderRepository::new(state.pool().clone());
    let data = repo
        .find_page(query.status, i64::from(limit), offset)
        .await?;
    let total = repo.count(query.status).await?;

    Ok(Json(Paginated::new(data, page, limit, total.max(0) as u64)))
}

/// GET /api/orders/:id - 订单详情（本人或管理员）
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool().clone());
    let detail = repo
        .find_detail(id)
        .await?
        .ok_or_else(|| AppError::with_message(
            shared::error::ErrorCode::OrderNotFound,
            format!("Order {id} not found"),
        ))?;

    let is_owner = detail.order.user_id == Some(user.id);
    if !is_owner && !user.has_permission("orders:manage") {
        return Err(AppError::forbidden("You can only view your own orders"));
    }

    Ok(Json(detail))
}

/// PUT /api/orders/:id/status - 订单状态流转
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<StatusUpdateResponse>> {
    user.require("orders:manage")?;

    let change =
        orders::update_status(state.pool(), id, payload.status, payload.payment_status).await?;

    state.audit.log(
        AuditAction::OrderStatusChanged,
        RESOURCE,
        id,
        Some(&user),
        json!({
            "from": change.old_status,
            "to": change.new_status,
            "paymentStatus": change.payment_status,
        }),
    );

    Ok(Json(StatusUpdateResponse {
        success: true,
        message: format!(
            "Order status updated from {} to {}",
            change.old_status, change.new_status
        ),
    }))
}
