//! 后台任务管理
//!
//! 注册、启动和统一关停所有后台任务。每个任务的 future 都包了
//! 一层 panic 捕获，单个任务崩溃不会影响其余任务和 HTTP 服务。

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// 启动预热任务，跑完即退出
    Warmup,
    /// 长期后台工作者
    Worker,
    /// 定时任务
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskKind::Warmup => "Warmup",
            TaskKind::Worker => "Worker",
            TaskKind::Periodic => "Periodic",
        })
    }
}

struct RegisteredTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// 持有全局 [`CancellationToken`]，`shutdown()` 取消后逐个等待任务退出。
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// let token = tasks.shutdown_token();
/// tasks.spawn("db_backup", TaskKind::Periodic, backup::run(pool, dir, 60, 24, token));
/// // ...
/// tasks.shutdown().await;
/// ```
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
    periodic_count: usize,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
            periodic_count: 0,
        }
    }

    /// 取消令牌，供任务内部监听 shutdown 信号
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 注册并启动一个后台任务
    ///
    /// Warmup 之外的任务自然退出视为异常，会记一条 warn。
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let wrapped = async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) if kind == TaskKind::Warmup => {}
                Ok(()) => {
                    tracing::warn!(task = %name, kind = %kind, "Background task exited early");
                }
                Err(payload) => {
                    tracing::error!(
                        task = %name,
                        kind = %kind,
                        panic = %panic_text(payload),
                        "Background task panicked"
                    );
                }
            }
        };

        if kind == TaskKind::Periodic {
            self.periodic_count += 1;
        }
        self.tasks.push(RegisteredTask {
            name,
            handle: tokio::spawn(wrapped),
        });
        tracing::debug!(task = %name, kind = %kind, "Background task registered");
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total = self.tasks.len(),
            periodic = self.periodic_count,
            "Background tasks running"
        );
    }

    /// 发出取消信号并等待所有任务退出
    pub async fn shutdown(self) {
        tracing::info!(count = self.tasks.len(), "Stopping background tasks");
        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => tracing::debug!(task = %task.name, "Task stopped"),
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(task = %task.name, "Task cancelled")
                }
                Err(e) => tracing::error!(task = %task.name, error = ?e, "Task join failed"),
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();
        tasks.spawn("waiter", TaskKind::Worker, async move {
            token.cancelled().await;
        });
        assert_eq!(tasks.len(), 1);
        tasks.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let mut tasks = BackgroundTasks::new();
        tasks.spawn("doomed", TaskKind::Periodic, async {
            panic!("boom");
        });
        // The panic is caught by the wrapper, shutdown must not propagate it
        tasks.shutdown().await;
    }

    #[test]
    fn test_panic_text_variants() {
        assert_eq!(panic_text(Box::new("static str")), "static str");
        assert_eq!(panic_text(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_text(Box::new(42u8)), "non-string panic payload");
    }
}
