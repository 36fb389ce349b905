//! 服务层
//!
//! - [`CryptoService`] - 员工 PII 信封加密 (AES-256-GCM)
//! - [`MailerService`] - SMTP 邮件通知
//! - [`backup`] - 数据库定时备份
//! - [`cleanup`] - 过期会话清理
//! - [`timesheet_sync`] - 日工时→周工时汇总

pub mod backup;
pub mod cleanup;
pub mod crypto;
pub mod mailer;
pub mod timesheet_sync;

pub use crypto::{CryptoError, CryptoService, MasterKey};
pub use mailer::MailerService;
