//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::orders::money;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use shared::error::{AppError, AppResult, ErrorCode};

const RESOURCE: &str = "product";

/// Query params for the catalog listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Include deactivated products (admin view)
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/products - 获取商品列表
///
/// 默认只返回上架商品；`include_inactive=true` 返回全部（需要权限）。
pub async fn list(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.pool().clone());

    let products = if query.include_inactive {
        let user = user.ok_or_else(AppError::unauthorized)?;
        user.require("catalog:manage")?;
        repo.find_all().await?
    } else {
        repo.find_all_active().await?
    };

    Ok(Json(products))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.pool().clone());
    let product = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found")))?;
    Ok(Json(product))
}

/// GET /api/products/slug/:slug - 按 slug 获取商品（店面详情页）
pub async fn get_by_slug(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.pool().clone());
    let product = repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::ProductNotFound, format!("Product '{slug}' not found")))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    user.require("catalog:manage")?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    money::validate_catalog_price(payload.price)?;
    if let Some(initial) = payload.initial_quantity
        && initial < 0
    {
        return Err(AppError::validation("initialQuantity must not be negative"));
    }

    let repo = ProductRepository::new(state.pool().clone());

    // 重复检查：slug / sku
    let slug = payload
        .slug
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| shared::util::slugify(&payload.name));
    if repo.slug_exists(&slug, None).await? {
        return Err(AppError::new(ErrorCode::ProductSlugExists).with_detail("slug", slug));
    }
    if repo.sku_exists(&payload.sku, None).await? {
        return Err(AppError::new(ErrorCode::ProductSkuExists).with_detail("sku", payload.sku.clone()));
    }

    let product = repo.create(payload).await?;

    state.audit.log(
        AuditAction::ProductCreated,
        RESOURCE,
        product.id,
        Some(&user),
        json!({ "name": product.name, "sku": product.sku, "price": product.price }),
    );

    Ok(Json(product))
}

/// PUT /api/products/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    user.require("catalog:manage")?;

    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        money::validate_catalog_price(price)?;
    }

    let repo = ProductRepository::new(state.pool().clone());

    if let Some(ref slug) = payload.slug
        && repo.slug_exists(slug, Some(id)).await?
    {
        return Err(AppError::new(ErrorCode::ProductSlugExists).with_detail("slug", slug.clone()));
    }
    if let Some(ref sku) = payload.sku
        && repo.sku_exists(sku, Some(id)).await?
    {
        return Err(AppError::new(ErrorCode::ProductSkuExists).with_detail("sku", sku.clone()));
    }

    let product = repo
        .update(id, payload)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found")))?;

    state.audit.log(
        AuditAction::ProductUpdated,
        RESOURCE,
        id,
        Some(&user),
        json!({ "name": product.name, "price": product.price, "isActive": product.is_active }),
    );

    Ok(Json(product))
}

/// DELETE /api/products/:id - 删除商品
///
/// 有订单引用时软下架（保留订单快照的上下文），否则物理删除。
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user.require("catalog:manage")?;

    let repo = ProductRepository::new(state.pool().clone());
    if repo.find_by_id(id).await?.is_none() {
        return Err(AppError::with_message(
            ErrorCode::ProductNotFound,
            format!("Product {id} not found"),
        ));
    }

    let deactivated_only = repo.has_order_history(id).await?;
    let removed = if deactivated_only {
        repo.deactivate(id).await?
    } else {
        repo.delete(id).await?
    };

    state.audit.log(
        AuditAction::ProductDeleted,
        RESOURCE,
        id,
        Some(&user),
        json!({ "softDelete": deactivated_only }),
    );

    Ok(Json(removed))
}
