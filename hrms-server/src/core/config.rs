use std::path::PathBuf;

use crate::auth::JwtConfig;

/// 服务器配置 - HRMS 后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/hrms | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REFRESH_TOKEN_TTL_DAYS | 7 | 刷新令牌有效期(天) |
/// | RESET_TOKEN_TTL_MINUTES | 30 | 密码重置令牌有效期(分钟) |
/// | LOGIN_DELAY_MS | 500 | 登录固定延迟(毫秒) |
/// | MAX_UPLOAD_BYTES | 10485760 | 文档上传大小上限 |
/// | BACKUP_INTERVAL_MINUTES | 60 | 数据库备份间隔 |
/// | BACKUP_RETENTION | 24 | 备份保留份数 |
/// | SESSION_CLEANUP_INTERVAL_MINUTES | 30 | 过期会话清理间隔 |
/// | TIMESHEET_SYNC_INTERVAL_MINUTES | 1440 | 日工时→周工时汇总间隔 |
/// | SMTP_HOST | (未设置则禁用邮件) | SMTP 服务器 |
/// | SMTP_PORT | 587 | SMTP 端口 |
/// | SMTP_USERNAME / SMTP_PASSWORD | 空 | SMTP 凭据 |
/// | SMTP_FROM | hrms@localhost | 发件人地址 |
/// | APP_BASE_URL | http://localhost:3000 | 邮件里链接的基础地址 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/hrms HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件、备份和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 认证相关 ===
    /// 刷新令牌有效期 (天)
    pub refresh_token_ttl_days: i64,
    /// 密码重置令牌有效期 (分钟)
    pub reset_token_ttl_minutes: i64,
    /// 登录固定延迟 (毫秒)，成功和失败都等待，抑制时序探测
    pub login_delay_ms: u64,

    // === 文档上传 ===
    /// 上传文件大小上限 (字节)
    pub max_upload_bytes: usize,

    // === 定时任务 ===
    /// 数据库备份间隔 (分钟)
    pub backup_interval_minutes: u64,
    /// 备份文件保留份数
    pub backup_retention: usize,
    /// 过期会话和重置令牌清理间隔 (分钟)
    pub session_cleanup_interval_minutes: u64,
    /// 日工时折算周工时的间隔 (分钟)
    pub timesheet_sync_interval_minutes: u64,

    // === 邮件通知 ===
    /// SMTP 服务器地址，未设置时邮件通知降级为日志
    pub smtp_host: Option<String>,
    /// SMTP 端口
    pub smtp_port: u16,
    /// SMTP 用户名
    pub smtp_username: String,
    /// SMTP 密码
    pub smtp_password: String,
    /// 发件人地址
    pub smtp_from: String,
    /// 邮件中链接的基础地址 (密码重置页等)
    pub app_base_url: String,

    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/hrms".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            refresh_token_ttl_days: std::env::var("REFRESH_TOKEN_TTL_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7),
            reset_token_ttl_minutes: std::env::var("RESET_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            login_delay_ms: std::env::var("LOGIN_DELAY_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(500),

            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10 * 1024 * 1024),

            backup_interval_minutes: std::env::var("BACKUP_INTERVAL_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            backup_retention: std::env::var("BACKUP_RETENTION")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(24),
            session_cleanup_interval_minutes: std::env::var("SESSION_CLEANUP_INTERVAL_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            timesheet_sync_interval_minutes: std::env::var("TIMESHEET_SYNC_INTERVAL_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(24 * 60),

            smtp_host: std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            smtp_from: std::env::var("SMTP_FROM").unwrap_or_else(|_| "hrms@localhost".into()),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.smtp_host = None;
        config
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 数据库文件路径 (work_dir/database/hrms.db)
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("hrms.db")
    }

    /// 上传文件目录 (work_dir/uploads)
    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    /// 备份目录 (work_dir/backups)
    pub fn backup_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("backups")
    }

    /// 日志目录 (work_dir/logs)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.upload_dir())?;
        std::fs::create_dir_all(self.backup_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 邮件通知是否启用
    pub fn mail_enabled(&self) -> bool {
        self.smtp_host.is_some()
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
