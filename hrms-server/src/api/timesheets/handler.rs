//! 工时处理函数
//!
//! 任务列表以 JSON 存库 (`tasks_json`)，读出时反序列化回 `tasks`。
//! 小时数按 `HH:MM` 提交，落库前折算成十进制累加。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ensure_role, load_employee_id, page_bounds};
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::auth::permissions::{APPROVER_ROLES, HR_ROLES};
use crate::core::ServerState;
use crate::db::repository::{
    daily_timesheet as daily_repo, employee as employee_repo, weekly_timesheet as weekly_repo,
};
use crate::services::timesheet_sync;
use crate::utils::validation::{MAX_NOTE_LEN, validate_date, validate_hours, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{
    ApprovalDecision, ApprovalStatus, BulkApprovalOutcome, BulkApprovalRequest, DailyTimesheet,
    DailyTimesheetCreate, DailyTimesheetUpdate, TimesheetTask, TimesheetTaskInput, WeeklyTimesheet,
};
use shared::util::{convert_hours_to_decimal, generate_task_id};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub employee_id: Option<i64>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    /// 缺省为昨天
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub updated: u64,
}

// ── Helpers ─────────────────────────────────────────────────────────

fn parse_status(value: &str) -> AppResult<ApprovalStatus> {
    match value {
        "REQUESTED" => Ok(ApprovalStatus::Requested),
        "APPROVED" => Ok(ApprovalStatus::Approved),
        "REJECTED" => Ok(ApprovalStatus::Rejected),
        other => Err(AppError::validation(format!(
            "Unknown status: {other} (expected REQUESTED, APPROVED or REJECTED)"
        ))),
    }
}

/// 校验任务列表并生成 (tasks_json, total_hours)
///
/// task_id 服务端按序分配 (TASK001, TASK002, ...)。
fn build_tasks(inputs: &[TimesheetTaskInput]) -> AppResult<(String, f64)> {
    if inputs.is_empty() {
        return Err(AppError::validation("Timesheet must contain at least one task"));
    }

    let mut tasks = Vec::with_capacity(inputs.len());
    let mut total = 0.0;
    for (i, input) in inputs.iter().enumerate() {
        validate_required_text(&input.description, "task description", MAX_NOTE_LEN)?;
        let decimal = convert_hours_to_decimal(&input.hours).ok_or_else(|| {
            AppError::validation(format!(
                "Task hours must be in HH:MM format, got '{}'",
                input.hours
            ))
        })?;
        total += decimal;
        tasks.push(TimesheetTask {
            task_id: generate_task_id(i as u32),
            description: input.description.clone(),
            hours: input.hours.clone(),
        });
    }
    validate_hours(total, "total_hours")?;

    let tasks_json = serde_json::to_string(&tasks)
        .map_err(|e| AppError::internal(format!("Failed to serialize tasks: {e}")))?;
    Ok((tasks_json, total))
}

fn hydrate(mut sheet: DailyTimesheet) -> AppResult<DailyTimesheet> {
    sheet.tasks = serde_json::from_str(&sheet.tasks_json)
        .map_err(|e| AppError::internal(format!("Corrupt tasks_json on timesheet {}: {e}", sheet.id)))?;
    Ok(sheet)
}

fn hydrate_weekly(mut sheet: WeeklyTimesheet) -> AppResult<WeeklyTimesheet> {
    sheet.entries = serde_json::from_str(&sheet.entries_json).map_err(|e| {
        AppError::internal(format!(
            "Corrupt entries_json on weekly timesheet {}: {e}",
            sheet.id
        ))
    })?;
    Ok(sheet)
}

/// 解析"以谁的身份提交"：显式 employee_id 要求 HR 或本人
async fn resolve_subject(
    state: &ServerState,
    user: &CurrentUser,
    explicit: Option<i64>,
) -> AppResult<i64> {
    match explicit {
        Some(employee_id) => {
            if !user.has_role(HR_ROLES) {
                let own = load_employee_id(state, user).await?;
                if own != employee_id {
                    return Err(AppError::forbidden(
                        "You can only submit records for yourself",
                    ));
                }
            }
            Ok(employee_id)
        }
        None => load_employee_id(state, user).await,
    }
}

/// 审批结果通知：取员工邮箱发审批邮件，邮件失败不影响响应
async fn notify_timesheet(
    state: &ServerState,
    employee_id: i64,
    date: &str,
    status: ApprovalStatus,
    comment: Option<&str>,
) -> AppResult<()> {
    if let Some(emp) = employee_repo::find_by_id(&state.pool(), employee_id).await? {
        state
            .mailer()
            .send_timesheet_decision(
                &emp.email,
                &format!("{} {}", emp.first_name, emp.last_name),
                date,
                status,
                comment,
            )
            .await;
    }
    Ok(())
}

// ── Daily handlers ──────────────────────────────────────────────────

/// POST /api/timesheets - 提交日工时
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DailyTimesheetCreate>,
) -> AppResult<Json<DailyTimesheet>> {
    let employee_id = resolve_subject(&state, &user, payload.employee_id).await?;
    validate_date(&payload.work_date, "work_date")?;
    let (tasks_json, total_hours) = build_tasks(&payload.tasks)?;

    // (employee_id, work_date) 唯一，重复提交由 UNIQUE 约束报 AlreadyExists
    let sheet = daily_repo::create(
        &state.pool(),
        employee_id,
        &payload.work_date,
        &tasks_json,
        total_hours,
    )
    .await?;

    audit_log!(
        "timesheet_submitted",
        actor_id = user.id,
        timesheet_id = sheet.id,
        employee_id = employee_id,
        work_date = sheet.work_date.clone(),
        total_hours = total_hours
    );

    Ok(Json(hydrate(sheet)?))
}

/// GET /api/timesheets - 列出日工时
///
/// 普通员工只能看自己的；`?status=` 和他人 `?employee_id=` 仅审批角色可用。
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<DailyTimesheet>>> {
    let (limit, offset) = page_bounds(query.limit, query.offset);

    let sheets = if let Some(status) = &query.status {
        ensure_role(&user, APPROVER_ROLES)?;
        daily_repo::find_by_status(&state.pool(), parse_status(status)?, limit, offset).await?
    } else {
        let employee_id = resolve_subject(&state, &user, query.employee_id).await?;
        daily_repo::find_by_employee(&state.pool(), employee_id, limit, offset).await?
    };

    sheets.into_iter().map(hydrate).collect::<AppResult<Vec<_>>>().map(Json)
}

/// GET /api/timesheets/{id} - 查询单张日工时
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<DailyTimesheet>> {
    let sheet = daily_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Timesheet {id}")))?;

    if !user.has_role(APPROVER_ROLES) {
        let own = load_employee_id(&state, &user).await?;
        if sheet.employee_id != own {
            return Err(AppError::forbidden("You can only view your own timesheets"));
        }
    }

    Ok(Json(hydrate(sheet)?))
}

/// PUT /api/timesheets/{id} - 修改日工时 (仅 REQUESTED 状态)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<DailyTimesheetUpdate>,
) -> AppResult<Json<DailyTimesheet>> {
    let sheet = daily_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Timesheet {id}")))?;

    if !user.has_role(HR_ROLES) {
        let own = load_employee_id(&state, &user).await?;
        if sheet.employee_id != own {
            return Err(AppError::forbidden("You can only edit your own timesheets"));
        }
    }

    let (tasks_json, total_hours) = build_tasks(&payload.tasks)?;
    let updated = daily_repo::update_tasks(&state.pool(), id, &tasks_json, total_hours).await?;

    audit_log!(
        "timesheet_updated",
        actor_id = user.id,
        timesheet_id = id,
        total_hours = total_hours
    );

    Ok(Json(hydrate(updated)?))
}

/// DELETE /api/timesheets/{id} - 撤回日工时 (仅 REQUESTED 状态)
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let sheet = daily_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Timesheet {id}")))?;

    if !user.has_role(HR_ROLES) {
        let own = load_employee_id(&state, &user).await?;
        if sheet.employee_id != own {
            return Err(AppError::forbidden("You can only withdraw your own timesheets"));
        }
    }

    daily_repo::delete(&state.pool(), id).await?;

    audit_log!("timesheet_withdrawn", actor_id = user.id, timesheet_id = id);

    Ok(Json(true))
}

async fn decide_daily(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
    status: ApprovalStatus,
    comment: Option<&str>,
) -> AppResult<DailyTimesheet> {
    let sheet = daily_repo::set_status(&state.pool(), id, status, user.id, comment).await?;

    audit_log!(
        "timesheet_decided",
        actor_id = user.id,
        timesheet_id = id,
        employee_id = sheet.employee_id,
        status = status.as_str()
    );

    notify_timesheet(state, sheet.employee_id, &sheet.work_date, status, comment).await?;
    hydrate(sheet)
}

/// POST /api/timesheets/{id}/approve - 批准日工时
pub async fn approve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> AppResult<Json<DailyTimesheet>> {
    let sheet = decide_daily(
        &state,
        &user,
        id,
        ApprovalStatus::Approved,
        decision.comment.as_deref(),
    )
    .await?;
    Ok(Json(sheet))
}

/// POST /api/timesheets/{id}/reject - 驳回日工时
pub async fn reject(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> AppResult<Json<DailyTimesheet>> {
    let sheet = decide_daily(
        &state,
        &user,
        id,
        ApprovalStatus::Rejected,
        decision.comment.as_deref(),
    )
    .await?;
    Ok(Json(sheet))
}

/// POST /api/timesheets/bulk-approval - 批量批准/驳回
///
/// 逐条处理，单条失败 (已决/不存在) 不中断其余条目。
pub async fn bulk_approval(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<BulkApprovalRequest>,
) -> AppResult<Json<Vec<BulkApprovalOutcome>>> {
    if !payload.status.is_final() {
        return Err(AppError::validation(
            "Bulk approval status must be APPROVED or REJECTED",
        ));
    }
    if payload.ids.is_empty() {
        return Err(AppError::validation("ids must not be empty"));
    }

    let mut outcomes = Vec::with_capacity(payload.ids.len());
    for id in payload.ids {
        match decide_daily(
            &state,
            &user,
            id,
            payload.status,
            payload.comment.as_deref(),
        )
        .await
        {
            Ok(_) => outcomes.push(BulkApprovalOutcome {
                id,
                ok: true,
                error: None,
            }),
            Err(e) => outcomes.push(BulkApprovalOutcome {
                id,
                ok: false,
                error: Some(e.message.clone()),
            }),
        }
    }

    Ok(Json(outcomes))
}

// ── Weekly handlers ─────────────────────────────────────────────────

/// GET /api/timesheets/weekly - 列出周工时
pub async fn list_weekly(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<WeeklyTimesheet>>> {
    let (limit, offset) = page_bounds(query.limit, query.offset);

    let sheets = if let Some(status) = &query.status {
        ensure_role(&user, APPROVER_ROLES)?;
        weekly_repo::find_by_status(&state.pool(), parse_status(status)?, limit, offset).await?
    } else {
        let employee_id = resolve_subject(&state, &user, query.employee_id).await?;
        weekly_repo::find_by_employee(&state.pool(), employee_id, limit, offset).await?
    };

    sheets
        .into_iter()
        .map(hydrate_weekly)
        .collect::<AppResult<Vec<_>>>()
        .map(Json)
}

/// GET /api/timesheets/weekly/{id} - 查询单张周工时
pub async fn get_weekly(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<WeeklyTimesheet>> {
    let sheet = weekly_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Weekly timesheet {id}")))?;

    if !user.has_role(APPROVER_ROLES) {
        let own = load_employee_id(&state, &user).await?;
        if sheet.employee_id != own {
            return Err(AppError::forbidden("You can only view your own timesheets"));
        }
    }

    Ok(Json(hydrate_weekly(sheet)?))
}

async fn decide_weekly(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
    status: ApprovalStatus,
    comment: Option<&str>,
) -> AppResult<WeeklyTimesheet> {
    let sheet = weekly_repo::set_status(&state.pool(), id, status, user.id, comment).await?;

    audit_log!(
        "weekly_timesheet_decided",
        actor_id = user.id,
        weekly_timesheet_id = id,
        employee_id = sheet.employee_id,
        status = status.as_str()
    );

    notify_timesheet(state, sheet.employee_id, &sheet.week_start, status, comment).await?;
    hydrate_weekly(sheet)
}

/// POST /api/timesheets/weekly/{id}/approve - 批准周工时
pub async fn approve_weekly(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> AppResult<Json<WeeklyTimesheet>> {
    let sheet = decide_weekly(
        &state,
        &user,
        id,
        ApprovalStatus::Approved,
        decision.comment.as_deref(),
    )
    .await?;
    Ok(Json(sheet))
}

/// POST /api/timesheets/weekly/{id}/reject - 驳回周工时
pub async fn reject_weekly(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> AppResult<Json<WeeklyTimesheet>> {
    let sheet = decide_weekly(
        &state,
        &user,
        id,
        ApprovalStatus::Rejected,
        decision.comment.as_deref(),
    )
    .await?;
    Ok(Json(sheet))
}

/// POST /api/timesheets/weekly/sync - 手动触发某天的日→周汇总 (HR)
///
/// 后台任务每天也会跑一遍，这个接口用于补数或修正。
pub async fn sync_weekly(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SyncRequest>,
) -> AppResult<Json<SyncResponse>> {
    ensure_role(&user, HR_ROLES)?;

    let day: NaiveDate = match &payload.date {
        Some(date) => validate_date(date, "date")?,
        None => (Utc::now() - Duration::days(1)).date_naive(),
    };

    let updated = timesheet_sync::sync_day(&state.pool(), day).await?;

    audit_log!(
        "timesheet_sync_triggered",
        actor_id = user.id,
        date = day.to_string(),
        updated = updated
    );

    Ok(Json(SyncResponse { updated }))
}
