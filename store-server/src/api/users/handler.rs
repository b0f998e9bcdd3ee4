//! User Admin API Handlers

use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use argon2::Argon2;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;

use crate::audit::AuditAction;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserCreate, UserUpdate};
use crate::db::repository::UserRepository;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_SHORT_TEXT_LEN, validate_password, validate_required_text,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::response::Paginated;

const RESOURCE: &str = "user";

const VALID_ROLES: &[&str] = &["admin", "manager", "customer"];

/// Hash a password with Argon2id and a fresh salt
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

fn validate_role(role: &str) -> AppResult<()> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(AppError::validation(format!("unknown role: {role}")).with_detail("field", "role"))
    }
}

/// Query params for listing users
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// GET /api/users - 用户列表（分页）
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Paginated<User>>> {
    user.require("users:manage")?;

    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);
    let offset = i64::from(page - 1) * i64::from(limit);

    let repo = UserRepository::new(state.pool().clone());
    let data = repo.find_page(i64::from(limit), offset).await?;
    let total = repo.count().await?;

    Ok(Json(Paginated::new(data, page, limit, total.max(0) as u64)))
}

/// GET /api/users/:id - 获取单个用户
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    user.require("users:manage")?;

    let repo = UserRepository::new(state.pool().clone());
    let found = repo.find_by_id(id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
    })?;
    Ok(Json(found))
}

/// POST /api/users - 创建用户
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<User>> {
    user.require("users:manage")?;

    validate_required_text(&payload.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_password(&payload.password)?;
    let role = payload.role.as_deref().unwrap_or("customer");
    validate_role(role)?;

    let repo = UserRepository::new(state.pool().clone());
    if repo.username_exists(&payload.username, None).await? {
        return Err(AppError::new(ErrorCode::UsernameExists)
            .with_detail("username", payload.username.clone()));
    }
    if repo.email_exists(&payload.email, None).await? {
        return Err(AppError::new(ErrorCode::EmailExists).with_detail("email", payload.email.clone()));
    }

    let password_hash = hash_password(&payload.password)?;
    let created = repo
        .create(&payload.username, &payload.email, &password_hash, role)
        .await?;

    state.audit.log(
        AuditAction::UserCreated,
        RESOURCE,
        created.id,
        Some(&user),
        json!({ "username": created.username, "role": created.role }),
    );

    Ok(Json(created))
}

/// PUT /api/users/:id - 更新用户
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    user.require("users:manage")?;

    if let Some(ref email) = payload.email {
        validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    }
    if let Some(ref password) = payload.password {
        validate_password(password)?;
    }
    if let Some(ref role) = payload.role {
        validate_role(role)?;
    }

    let repo = UserRepository::new(state.pool().clone());
    if let Some(ref email) = payload.email
        && repo.email_exists(email, Some(id)).await?
    {
        return Err(AppError::new(ErrorCode::EmailExists).with_detail("email", email.clone()));
    }

    let password_hash = match payload.password.as_deref() {
        Some(p) => Some(hash_password(p)?),
        None => None,
    };

    let updated = repo
        .update(
            id,
            payload.email.as_deref(),
            password_hash.as_deref(),
            payload.role.as_deref(),
            payload.is_active,
        )
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
        })?;

    state.audit.log(
        AuditAction::UserUpdated,
        RESOURCE,
        id,
        Some(&user),
        json!({ "role": updated.role, "isActive": updated.is_active }),
    );

    Ok(Json(updated))
}

/// DELETE /api/users/:id - 删除用户
///
/// admin 账户受保护，不可删除。
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user.require("users:manage")?;

    let repo = UserRepository::new(state.pool().clone());
    let target = repo.find_by_id(id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
    })?;

    if target.role == "admin" {
        return Err(AppError::new(ErrorCode::CannotDeleteAdmin));
    }

    let deleted = repo.delete(id).await?;

    state.audit.log(
        AuditAction::UserDeleted,
        RESOURCE,
        id,
        Some(&user),
        json!({ "username": target.username }),
    );

    Ok(Json(deleted))
}
