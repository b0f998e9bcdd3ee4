//! Permission Definitions
//!
//! Simplified RBAC permission system.
//!
//! ## 设计原则
//! - 浏览目录、下单等基础操作无需权限，登录即可使用
//! - 模块化权限：按功能模块授权
//! - 用户管理：仅 admin 角色可用

/// 可配置权限列表
/// 不包含 "all" 和 "users:manage"，这些是系统级权限
pub const ALL_PERMISSIONS: &[&str] = &[
    "catalog:manage",   // 商品管理（增删改查、上下架）
    "inventory:manage", // 库存管理（调整实物库存）
    "orders:manage",    // 订单管理（查看全部订单、状态流转）
    "reports:view",     // 报表查看
    "audit:view",       // 审计日志查看
];

/// Admin 专属权限（不在可配置列表中）
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &[
    "users:manage", // 用户管理
    "all",          // 超级权限
];

/// Default role permissions
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 经理角色默认权限（全部可配置权限）
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = &[
    "catalog:manage",
    "inventory:manage",
    "orders:manage",
    "reports:view",
    "audit:view",
];

/// 普通顾客默认权限（仅基础操作）
pub const DEFAULT_CUSTOMER_PERMISSIONS: &[&str] = &[];

/// Get permissions for a role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    match role_name {
        "admin" => DEFAULT_ADMIN_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        "manager" => DEFAULT_MANAGER_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        "customer" => DEFAULT_CUSTOMER_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_gets_superuser_permission() {
        assert_eq!(get_default_permissions("admin"), vec!["all".to_string()]);
    }

    #[test]
    fn manager_gets_every_configurable_permission() {
        let perms = get_default_permissions("manager");
        for p in ALL_PERMISSIONS {
            assert!(perms.iter().any(|x| x == p), "missing {p}");
        }
        assert!(!perms.iter().any(|x| x == "all"));
    }

    #[test]
    fn unknown_role_gets_nothing() {
        assert!(get_default_permissions("intern").is_empty());
    }
}
