//! 数据库备份
//!
//! 用 `VACUUM INTO` 生成带时间戳的快照文件，按配置份数滚动保留。

use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use shared::error::{AppError, AppResult};

const BACKUP_PREFIX: &str = "hrms-";
const BACKUP_SUFFIX: &str = ".db";

/// 执行一次备份并清理超出保留份数的旧文件
///
/// 返回新备份文件的路径。
pub async fn backup_once(
    pool: &SqlitePool,
    backup_dir: &Path,
    retention: usize,
) -> AppResult<PathBuf> {
    std::fs::create_dir_all(backup_dir)
        .map_err(|e| AppError::internal(format!("Failed to create backup dir: {}", e)))?;

    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let target = backup_dir.join(format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}"));
    let target_str = target.to_string_lossy().replace('\'', "''");

    // VACUUM INTO 不支持参数绑定，路径由配置拼出
    sqlx::query(&format!("VACUUM INTO '{}'", target_str))
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("VACUUM INTO failed: {}", e)))?;

    tracing::info!(path = %target.display(), "Database backup written");

    prune_old_backups(backup_dir, retention)?;
    Ok(target)
}

/// 删除超出保留份数的旧备份 (文件名含时间戳，字典序即时间序)
fn prune_old_backups(backup_dir: &Path, retention: usize) -> AppResult<()> {
    let mut backups: Vec<PathBuf> = std::fs::read_dir(backup_dir)
        .map_err(|e| AppError::internal(format!("Failed to read backup dir: {}", e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(BACKUP_SUFFIX))
        })
        .collect();

    if backups.len() <= retention {
        return Ok(());
    }

    backups.sort();
    let excess = backups.len() - retention;
    for old in backups.into_iter().take(excess) {
        match std::fs::remove_file(&old) {
            Ok(()) => tracing::debug!(path = %old.display(), "Pruned old backup"),
            Err(e) => tracing::warn!(path = %old.display(), error = %e, "Failed to prune backup"),
        }
    }
    Ok(())
}

/// 周期循环：按配置间隔备份数据库
///
/// 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。
pub async fn run(
    pool: SqlitePool,
    backup_dir: PathBuf,
    interval_minutes: u64,
    retention: usize,
    shutdown: CancellationToken,
) {
    let period = std::time::Duration::from_secs(interval_minutes * 60);
    let mut interval = tokio::time::interval(period);
    // 首次 tick 立即返回，启动即落一份快照
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.cancelled() => {
                tracing::info!("Backup task received shutdown signal");
                return;
            }
        }

        if let Err(e) = backup_once(&pool, &backup_dir, retention).await {
            tracing::error!(error = %e, "Database backup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempfile::tempdir().expect("tempdir");
        for stamp in [
            "20240301-000000",
            "20240302-000000",
            "20240303-000000",
            "20240304-000000",
        ] {
            std::fs::write(
                dir.path().join(format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}")),
                b"snapshot",
            )
            .expect("write");
        }
        // Unrelated file must survive pruning
        std::fs::write(dir.path().join("notes.txt"), b"keep").expect("write");

        prune_old_backups(dir.path(), 2).expect("prune");

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "hrms-20240303-000000.db".to_string(),
                "hrms-20240304-000000.db".to_string(),
                "notes.txt".to_string(),
            ]
        );
    }
}
