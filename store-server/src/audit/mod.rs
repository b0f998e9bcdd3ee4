//! 审计日志模块
//!
//! Append-only、SHA256 哈希链防篡改的操作日志。
//! 写操作的处理器在变更提交后显式调用 [`AuditService::log`]，
//! 并传入当前操作者。

pub mod service;
pub mod storage;
pub mod types;

pub use service::{AuditLogRequest, AuditService};
pub use storage::{AuditStorage, AuditStorageError};
pub use types::{AuditAction, AuditEntry, AuditQuery, ChainVerification};
