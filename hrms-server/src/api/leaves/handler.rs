//! 请假处理函数
//!
//! 天数支持半天 (0.5 步进)；缺省按日期区间自然天数计。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{ensure_role, load_employee_id, page_bounds};
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::auth::permissions::{APPROVER_ROLES, HR_ROLES};
use crate::core::ServerState;
use crate::db::repository::{employee as employee_repo, leave as leave_repo};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_date, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{ApprovalDecision, ApprovalStatus, LeaveRequest, LeaveRequestCreate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub employee_id: Option<i64>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

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

fn hydrate(mut leave: LeaveRequest) -> AppResult<LeaveRequest> {
    leave.approvers = serde_json::from_str(&leave.approvers_json).map_err(|e| {
        AppError::internal(format!(
            "Corrupt approvers_json on leave request {}: {e}",
            leave.id
        ))
    })?;
    Ok(leave)
}

/// 校验并确定请假天数
///
/// 显式天数必须为 0.5 的倍数且不超过日期区间；缺省取区间自然天数。
fn resolve_day_count(
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    explicit: Option<f64>,
) -> AppResult<f64> {
    let span_days = (end - start).num_days() + 1;
    match explicit {
        Some(days) => {
            if !days.is_finite() || days <= 0.0 {
                return Err(AppError::validation("day_count must be positive"));
            }
            if (days * 2.0).fract() != 0.0 {
                return Err(AppError::validation(
                    "day_count must be a multiple of 0.5",
                ));
            }
            if days > span_days as f64 {
                return Err(AppError::validation(format!(
                    "day_count {days} exceeds the date range ({span_days} days)"
                )));
            }
            Ok(days)
        }
        None => Ok(span_days as f64),
    }
}

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

/// POST /api/leaves - 提交请假申请
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<LeaveRequestCreate>,
) -> AppResult<Json<LeaveRequest>> {
    let employee_id = resolve_subject(&state, &user, payload.employee_id).await?;

    validate_required_text(&payload.leave_type, "leave_type", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    let start = validate_date(&payload.start_date, "start_date")?;
    let end = validate_date(&payload.end_date, "end_date")?;
    if end < start {
        return Err(AppError::validation("end_date must not be before start_date"));
    }
    let day_count = resolve_day_count(start, end, payload.day_count)?;

    let approvers_json = serde_json::to_string(&payload.approvers)
        .map_err(|e| AppError::internal(format!("Failed to serialize approvers: {e}")))?;

    let leave = leave_repo::create(
        &state.pool(),
        employee_id,
        &payload.leave_type,
        &payload.start_date,
        &payload.end_date,
        day_count,
        &payload.reason,
        &approvers_json,
    )
    .await?;

    audit_log!(
        "leave_requested",
        actor_id = user.id,
        leave_id = leave.id,
        employee_id = employee_id,
        leave_type = leave.leave_type.clone(),
        day_count = day_count
    );

    Ok(Json(hydrate(leave)?))
}

/// GET /api/leaves - 列出请假申请
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    let (limit, offset) = page_bounds(query.limit, query.offset);

    let leaves = if let Some(status) = &query.status {
        ensure_role(&user, APPROVER_ROLES)?;
        leave_repo::find_by_status(&state.pool(), parse_status(status)?, limit, offset).await?
    } else {
        let employee_id = resolve_subject(&state, &user, query.employee_id).await?;
        leave_repo::find_by_employee(&state.pool(), employee_id, limit, offset).await?
    };

    leaves
        .into_iter()
        .map(hydrate)
        .collect::<AppResult<Vec<_>>>()
        .map(Json)
}

/// GET /api/leaves/{id} - 查询单条请假申请
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<LeaveRequest>> {
    let leave = leave_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Leave request {id}")))?;

    if !user.has_role(APPROVER_ROLES) {
        let own = load_employee_id(&state, &user).await?;
        if leave.employee_id != own {
            return Err(AppError::forbidden(
                "You can only view your own leave requests",
            ));
        }
    }

    Ok(Json(hydrate(leave)?))
}

/// DELETE /api/leaves/{id} - 撤回请假申请 (仅 REQUESTED 状态)
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let leave = leave_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Leave request {id}")))?;

    if !user.has_role(HR_ROLES) {
        let own = load_employee_id(&state, &user).await?;
        if leave.employee_id != own {
            return Err(AppError::forbidden(
                "You can only withdraw your own leave requests",
            ));
        }
    }

    leave_repo::delete(&state.pool(), id).await?;

    audit_log!("leave_withdrawn", actor_id = user.id, leave_id = id);

    Ok(Json(true))
}

async fn decide(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
    status: ApprovalStatus,
    comment: Option<&str>,
) -> AppResult<LeaveRequest> {
    let leave = leave_repo::set_status(&state.pool(), id, status, user.id, comment).await?;

    audit_log!(
        "leave_decided",
        actor_id = user.id,
        leave_id = id,
        employee_id = leave.employee_id,
        status = status.as_str()
    );

    if let Some(emp) = employee_repo::find_by_id(&state.pool(), leave.employee_id).await? {
        state
            .mailer()
            .send_leave_decision(
                &emp.email,
                &format!("{} {}", emp.first_name, emp.last_name),
                &leave.start_date,
                &leave.end_date,
                status,
                comment,
            )
            .await;
    }

    hydrate(leave)
}

/// POST /api/leaves/{id}/approve - 批准请假
pub async fn approve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> AppResult<Json<LeaveRequest>> {
    let leave = decide(
        &state,
        &user,
        id,
        ApprovalStatus::Approved,
        decision.comment.as_deref(),
    )
    .await?;
    Ok(Json(leave))
}

/// POST /api/leaves/{id}/reject - 驳回请假
pub async fn reject(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> AppResult<Json<LeaveRequest>> {
    let leave = decide(
        &state,
        &user,
        id,
        ApprovalStatus::Rejected,
        decision.comment.as_deref(),
    )
    .await?;
    Ok(Json(leave))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
    }

    #[test]
    fn test_day_count_defaults_to_span() {
        let days = resolve_day_count(date("2024-03-11"), date("2024-03-13"), None).unwrap();
        assert!((days - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_day_count_accepts_half_days() {
        assert!(resolve_day_count(date("2024-03-11"), date("2024-03-11"), Some(0.5)).is_ok());
        assert!(resolve_day_count(date("2024-03-11"), date("2024-03-12"), Some(1.5)).is_ok());
    }

    #[test]
    fn test_day_count_rejects_bad_values() {
        let start = date("2024-03-11");
        let end = date("2024-03-12");
        assert!(resolve_day_count(start, end, Some(0.3)).is_err());
        assert!(resolve_day_count(start, end, Some(-1.0)).is_err());
        assert!(resolve_day_count(start, end, Some(2.5)).is_err());
        assert!(resolve_day_count(start, end, Some(f64::NAN)).is_err());
    }
}
