//! HRMS Server - 人力资源管理系统后端
//!
//! 人事档案 (PII 信封加密)、工时与请假审批、客户/项目/资源分配、
//! 员工证件管理，外加 JWT 认证和 SMTP 通知。
//!
//! ```text
//! hrms-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT、密码、权限、认证中间件
//! ├── services/      # PII 加密、邮件、备份、会话清理、周表汇总
//! ├── api/           # 每个资源一组路由 + handler
//! ├── db/            # 连接池、迁移、仓储
//! └── utils/         # 日志、输入校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// 常用类型在 crate 根再导出一遍，测试和 main 不用按模块路径找
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use services::{CryptoService, MailerService};
pub use utils::logger::{cleanup_old_logs, init_logger_with_file};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode, ErrorResponse};

// 审批/人事数据变更走 audit target，和普通运行日志分流
#[macro_export]
macro_rules! audit_log {
    ($event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "audit",
            event = $event,
            $($key = $value),*
        );
    };
}

// 认证失败、越权访问等安全事件走 security target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
///
/// 必须在 [`Config::from_env()`] 之前调用，保证 .env 中的变量可见。
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   __  ______  ___________
  / / / / __ \/  |/  / ___/
 / /_/ / /_/ / /|_/ /\__ \
/ __  / _, _/ /  / /___/ /
/_/ /_/_/ |_/_/  /_//____/
    "#
    );
}
