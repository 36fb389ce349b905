//! 日志初始化
//!
//! 控制台输出为主，配置了 LOG_DIR 时追加按天滚动的文件输出，
//! 并在启动时清掉两周前的旧日志。

use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing_subscriber::EnvFilter;

/// 日志文件名前缀，滚动文件形如 `hrms-server.2026-08-06`
const LOG_FILE_PREFIX: &str = "hrms-server";
const LOG_RETENTION_DAYS: u64 = 14;

/// 初始化全局日志订阅者
///
/// `RUST_LOG` 优先于 `log_level` 参数。
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    match log_dir.filter(|dir| Path::new(dir).exists()) {
        Some(dir) => {
            if let Err(e) = cleanup_old_logs(dir, LOG_RETENTION_DAYS) {
                eprintln!("Failed to clean up old logs: {e}");
            }
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            builder.with_writer(appender).init();
        }
        None => builder.init(),
    }
}

/// 删除 `log_dir` 下修改时间早于 `days` 天的滚动日志文件
pub fn cleanup_old_logs(log_dir: &str, days: u64) -> anyhow::Result<()> {
    let Some(cutoff) = SystemTime::now().checked_sub(Duration::from_secs(days * 24 * 3600)) else {
        return Ok(());
    };
    let dir = Path::new(log_dir);
    if !dir.exists() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_rolled_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_rolled_log {
            continue;
        }
        let expired = entry
            .metadata()
            .and_then(|m| m.modified())
            .map(|modified| modified < cutoff)
            .unwrap_or(false);
        if expired {
            let _ = std::fs::remove_file(entry.path());
        }
    }
    Ok(())
}
