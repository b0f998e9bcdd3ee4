use std::sync::Arc;

use crate::audit::AuditService;
use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use shared::error::AppError;
use sqlx::SqlitePool;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是店面后端的核心数据结构，Clone 只做浅拷贝。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | audit | Arc<AuditService> | 审计日志服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库服务
    pub db: DbService,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 审计日志服务
    pub audit: Arc<AuditService>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/store.db，自动迁移)
    /// 3. 审计服务 (writer 任务)
    /// 4. JWT 服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_path();
        let db_path_str = db_path
            .to_str()
            .ok_or_else(|| AppError::internal("Database path is not valid UTF-8"))?;
        let db = DbService::new(db_path_str).await?;

        let audit = AuditService::start(db.pool.clone(), config.audit_buffer_size);
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service,
            audit,
        })
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
