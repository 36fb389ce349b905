use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::Config;
use crate::db::DbService;
use crate::services::{CryptoService, MailerService};

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是 HRMS 后端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | crypto | Arc<CryptoService> | PII 信封加密服务 |
/// | mailer | Arc<MailerService> | 邮件通知服务 |
///
/// # 使用示例
///
/// ```ignore
/// // 获取数据库连接池
/// let pool = state.pool();
///
/// // 解密员工 PII
/// state.crypto().decrypt_employee(&mut employee)?;
/// ```
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库服务 (SQLite)
    pub db: DbService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// PII 信封加密服务
    pub crypto: Arc<CryptoService>,
    /// 邮件通知服务
    pub mailer: Arc<MailerService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize()`] 方法代替
    pub fn new(
        config: Config,
        db: DbService,
        jwt_service: Arc<JwtService>,
        crypto: Arc<CryptoService>,
        mailer: Arc<MailerService>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            crypto,
            mailer,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (database/uploads/backups/logs)
    /// 2. 数据库 (work_dir/database/hrms.db，含迁移)
    /// 3. 各服务 (JWT, Crypto, Mailer)
    ///
    /// # Panics
    ///
    /// 目录创建或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_path();
        let db = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let crypto = Arc::new(CryptoService::new());
        let mailer = Arc::new(MailerService::new(config));

        Self::new(config.clone(), db, jwt_service, crypto, mailer)
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 数据库定时备份 (Periodic)
    /// - 过期会话清理 (Periodic)
    /// - 日工时→周工时汇总 (Periodic)
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let shutdown = tasks.shutdown_token();

        tasks.spawn(
            "db_backup",
            TaskKind::Periodic,
            crate::services::backup::run(
                self.pool(),
                self.config.backup_dir(),
                self.config.backup_interval_minutes,
                self.config.backup_retention,
                shutdown.clone(),
            ),
        );

        tasks.spawn(
            "session_cleanup",
            TaskKind::Periodic,
            crate::services::cleanup::run(
                self.pool(),
                self.config.session_cleanup_interval_minutes,
                shutdown.clone(),
            ),
        );

        tasks.spawn(
            "timesheet_sync",
            TaskKind::Periodic,
            crate::services::timesheet_sync::run(
                self.pool(),
                self.config.timesheet_sync_interval_minutes,
                shutdown,
            ),
        );

        tasks.log_summary();
        tasks
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> SqlitePool {
        self.db.pool.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取上传目录
    pub fn upload_dir(&self) -> PathBuf {
        self.config.upload_dir()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 获取加密服务
    pub fn crypto(&self) -> &CryptoService {
        &self.crypto
    }

    /// 获取邮件服务
    pub fn mailer(&self) -> &MailerService {
        &self.mailer
    }
}
