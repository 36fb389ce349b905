//! SQLite 连接池与迁移
//!
//! 所有仓储函数都直接拿 `&SqlitePool`，这里只负责把池子建好。

pub mod repository;

use std::str::FromStr;
use std::time::Duration;

use shared::error::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database service, owns the SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// 打开 (必要时创建) 数据库，应用迁移
    ///
    /// WAL + NORMAL 同步，外键开启，写冲突等待 [`BUSY_TIMEOUT`] 后才报错。
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(connect_options(db_path)?)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        tracing::info!(path = %db_path, "SQLite pool ready (WAL)");

        sqlx::migrate!("./migrations")
            .set_ignore_missing(true)
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Schema migrations up to date");

        Ok(Self { pool })
    }
}

fn connect_options(db_path: &str) -> Result<SqliteConnectOptions, AppError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
        .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?;
    Ok(options
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
        .optimize_on_close(true, None))
}
