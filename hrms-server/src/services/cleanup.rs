//! 过期会话与重置令牌清理

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use shared::error::AppResult;

use crate::db::repository::session;

/// 删除过期的会话行和密码重置令牌
///
/// 返回 (删除的会话数, 删除的重置令牌数)。
pub async fn cleanup_once(pool: &SqlitePool) -> AppResult<(u64, u64)> {
    let now = shared::util::now_rfc3339();
    let sessions = session::delete_expired_sessions(pool, &now).await?;
    let tokens = session::delete_expired_reset_tokens(pool, &now).await?;
    if sessions > 0 || tokens > 0 {
        tracing::info!(sessions, tokens, "Expired sessions and reset tokens cleaned up");
    }
    Ok((sessions, tokens))
}

/// 周期循环：按配置间隔清理过期会话
///
/// 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。
pub async fn run(pool: SqlitePool, interval_minutes: u64, shutdown: CancellationToken) {
    let period = std::time::Duration::from_secs(interval_minutes * 60);
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.cancelled() => {
                tracing::info!("Session cleanup received shutdown signal");
                return;
            }
        }

        if let Err(e) = cleanup_once(&pool).await {
            tracing::error!(error = %e, "Session cleanup failed");
        }
    }
}
