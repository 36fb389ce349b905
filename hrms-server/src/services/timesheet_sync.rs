//! 日工时→周工时汇总
//!
//! 每天把前一天 APPROVED 的日工时折算进对应的周工时行。
//! 已审批定稿的周行不会被覆盖 (upsert 的冲突分支只在 REQUESTED 时生效)。

use chrono::{Datelike, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use shared::error::{AppError, AppResult};
use shared::models::{TimesheetTask, WeeklyEntry};

use crate::db::repository::{daily_timesheet, weekly_timesheet};

/// 所在周的周一和周日 (`YYYY-MM-DD`)
pub fn week_bounds(date: NaiveDate) -> (String, String) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let sunday = monday + Duration::days(6);
    (
        monday.format("%Y-%m-%d").to_string(),
        sunday.format("%Y-%m-%d").to_string(),
    )
}

/// 把指定日期的 APPROVED 日工时折算进各员工的周工时行
///
/// 返回更新的周行数。同一 work_date 的旧条目被替换，幂等可重跑。
pub async fn sync_day(pool: &SqlitePool, day: NaiveDate) -> AppResult<u64> {
    let date_str = day.format("%Y-%m-%d").to_string();
    let dailies = daily_timesheet::find_approved_for_date(pool, &date_str).await?;
    if dailies.is_empty() {
        tracing::debug!(date = %date_str, "No approved daily timesheets to fold");
        return Ok(0);
    }

    let (week_start, week_end) = week_bounds(day);
    let mut updated = 0u64;

    for daily in dailies {
        let tasks: Vec<TimesheetTask> = serde_json::from_str(&daily.tasks_json)
            .map_err(|e| AppError::internal(format!("Corrupt tasks_json for daily timesheet {}: {}", daily.id, e)))?;
        let entry = WeeklyEntry {
            work_date: daily.work_date.clone(),
            total_hours: daily.total_hours,
            tasks,
        };

        let mut entries: Vec<WeeklyEntry> =
            match weekly_timesheet::find_by_employee_and_week(pool, daily.employee_id, &week_start)
                .await?
            {
                Some(existing) => serde_json::from_str(&existing.entries_json).map_err(|e| {
                    AppError::internal(format!(
                        "Corrupt entries_json for weekly timesheet {}: {}",
                        existing.id, e
                    ))
                })?,
                None => Vec::new(),
            };

        entries.retain(|e| e.work_date != entry.work_date);
        entries.push(entry);
        entries.sort_by(|a, b| a.work_date.cmp(&b.work_date));

        let total_hours: f64 = entries.iter().map(|e| e.total_hours).sum();
        let entries_json = serde_json::to_string(&entries)
            .map_err(|e| AppError::internal(format!("Failed to encode weekly entries: {}", e)))?;

        weekly_timesheet::upsert_week(
            pool,
            daily.employee_id,
            &week_start,
            &week_end,
            &entries_json,
            total_hours,
        )
        .await?;
        updated += 1;
    }

    tracing::info!(date = %date_str, rows = updated, "Folded daily timesheets into weekly rows");
    Ok(updated)
}

/// 周期循环：按配置间隔折算昨天的日工时
///
/// 注册为 `TaskKind::Periodic`，在 `start_background_tasks()` 中启动。
pub async fn run(pool: SqlitePool, interval_minutes: u64, shutdown: CancellationToken) {
    let period = std::time::Duration::from_secs(interval_minutes * 60);
    let mut interval = tokio::time::interval(period);
    // 首次 tick 立即返回，启动时即补算一次昨天的数据
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.cancelled() => {
                tracing::info!("Timesheet sync received shutdown signal");
                return;
            }
        }

        let yesterday = Utc::now().date_naive() - Duration::days(1);
        if let Err(e) = sync_day(&pool, yesterday).await {
            tracing::error!(error = %e, "Timesheet sync failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_bounds() {
        // 2024-03-13 is a Wednesday
        let wed = NaiveDate::from_ymd_opt(2024, 3, 13).expect("date");
        assert_eq!(
            week_bounds(wed),
            ("2024-03-11".to_string(), "2024-03-17".to_string())
        );

        // Monday maps to itself
        let mon = NaiveDate::from_ymd_opt(2024, 3, 11).expect("date");
        assert_eq!(week_bounds(mon).0, "2024-03-11");

        // Sunday belongs to the preceding Monday's week
        let sun = NaiveDate::from_ymd_opt(2024, 3, 17).expect("date");
        assert_eq!(
            week_bounds(sun),
            ("2024-03-11".to_string(), "2024-03-17".to_string())
        );
    }
}
