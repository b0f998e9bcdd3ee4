//! 认证模块 - JWT 验证、当前用户、权限
//!
//! 令牌签发由外部认证服务负责（黑盒），本模块只做验证：
//! [`require_auth`] 中间件解析 `Authorization: Bearer` 头，
//! 将 [`CurrentUser`] 注入请求扩展。

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use permissions::get_default_permissions;

use shared::error::AppError;

/// The authenticated principal attached to each request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl CurrentUser {
    /// True when the user holds `permission` (or the superuser permission)
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == "all" || p == permission)
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Guard a handler behind one permission
    pub fn require(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Missing required permission: {permission}"
            )))
        }
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id: i64 = claims
            .sub
            .parse()
            .map_err(|_| format!("non-numeric subject: {}", claims.sub))?;
        let permissions = if claims.permissions.is_empty() {
            Vec::new()
        } else {
            claims
                .permissions
                .split(',')
                .map(|s| s.trim().to_string())
                .collect()
        };
        Ok(Self {
            id,
            username: claims.username,
            role: claims.role,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(permissions: &[&str]) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "t".into(),
            role: "manager".into(),
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn superuser_permission_grants_everything() {
        let u = user(&["all"]);
        assert!(u.has_permission("orders:manage"));
        assert!(u.require("users:manage").is_ok());
    }

    #[test]
    fn missing_permission_is_rejected() {
        let u = user(&["reports:view"]);
        assert!(!u.has_permission("orders:manage"));
        assert!(u.require("orders:manage").is_err());
    }

    #[test]
    fn claims_with_bad_subject_are_rejected() {
        let claims = Claims {
            sub: "not-a-number".into(),
            username: "x".into(),
            role: "customer".into(),
            permissions: String::new(),
            exp: 0,
            iat: 0,
            iss: "store-server".into(),
            aud: "storefront".into(),
        };
        assert!(CurrentUser::try_from(claims).is_err());
    }
}
