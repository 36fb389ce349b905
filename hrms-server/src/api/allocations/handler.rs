//! 资源派单处理函数
//!
//! (project, customer, employee) 三元组唯一；customer_id 创建时从项目
//! 冗余过来。派单只停用不删除，工时统计还要引用它。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::{ensure_permission, ensure_role, page_bounds};
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::auth::permissions::ADMIN_ROLES;
use crate::core::ServerState;
use crate::db::repository::{
    employee as employee_repo, project as project_repo,
    resource_allocation as allocation_repo,
};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_date, validate_optional_text};
use crate::utils::{AppError, AppResult};
use shared::models::{ResourceAllocation, ResourceAllocationCreate, ResourceAllocationUpdate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

fn validate_dates(
    start_date: &Option<String>,
    end_date: &Option<String>,
) -> AppResult<()> {
    let start = start_date
        .as_deref()
        .map(|d| validate_date(d, "start_date"))
        .transpose()?;
    let end = end_date
        .as_deref()
        .map(|d| validate_date(d, "end_date"))
        .transpose()?;
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        return Err(AppError::validation("end_date must not be before start_date"));
    }
    Ok(())
}

/// GET /api/allocations - 列出派单 (含项目/客户/员工名)
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ResourceAllocation>>> {
    ensure_permission(&user, "resources:read")?;
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let allocations = allocation_repo::find_all(&state.pool(), limit, offset).await?;
    Ok(Json(allocations))
}

/// GET /api/allocations/by-employee/{employee_id} - 某员工的派单
pub async fn list_by_employee(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(employee_id): Path<i64>,
) -> AppResult<Json<Vec<ResourceAllocation>>> {
    ensure_permission(&user, "resources:read")?;
    let allocations = allocation_repo::find_by_employee(&state.pool(), employee_id).await?;
    Ok(Json(allocations))
}

/// GET /api/allocations/by-project/{project_id} - 某项目的派单
pub async fn list_by_project(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<i64>,
) -> AppResult<Json<Vec<ResourceAllocation>>> {
    ensure_permission(&user, "resources:read")?;
    let allocations = allocation_repo::find_by_project(&state.pool(), project_id).await?;
    Ok(Json(allocations))
}

/// GET /api/allocations/{id} - 查询单条派单
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ResourceAllocation>> {
    ensure_permission(&user, "resources:read")?;
    let allocation = allocation_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Allocation {id}")))?;
    Ok(Json(allocation))
}

/// POST /api/allocations - 创建派单 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ResourceAllocationCreate>,
) -> AppResult<Json<ResourceAllocation>> {
    ensure_role(&user, ADMIN_ROLES)?;
    validate_optional_text(&payload.allocation_role, "allocation_role", MAX_SHORT_TEXT_LEN)?;
    validate_dates(&payload.start_date, &payload.end_date)?;

    let project = project_repo::find_by_id(&state.pool(), payload.project_id)
        .await?
        .ok_or_else(|| {
            AppError::validation(format!("Project {} does not exist", payload.project_id))
        })?;

    let employee = employee_repo::find_by_id(&state.pool(), payload.employee_id)
        .await?
        .ok_or_else(|| {
            AppError::validation(format!("Employee {} does not exist", payload.employee_id))
        })?;
    if !employee.is_active {
        return Err(AppError::validation(format!(
            "Employee {} is inactive",
            payload.employee_id
        )));
    }

    // 重复三元组由 UNIQUE 约束报 AlreadyExists
    let allocation =
        allocation_repo::create(&state.pool(), &payload, project.customer_id).await?;

    audit_log!(
        "allocation_created",
        actor_id = user.id,
        allocation_id = allocation.id,
        project_id = allocation.project_id,
        customer_id = allocation.customer_id,
        employee_id = allocation.employee_id
    );

    Ok(Json(allocation))
}

/// PUT /api/allocations/{id} - 更新派单 (管理员)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ResourceAllocationUpdate>,
) -> AppResult<Json<ResourceAllocation>> {
    ensure_role(&user, ADMIN_ROLES)?;
    validate_optional_text(&payload.allocation_role, "allocation_role", MAX_SHORT_TEXT_LEN)?;
    validate_dates(&payload.start_date, &payload.end_date)?;

    let allocation = allocation_repo::update(&state.pool(), id, &payload).await?;

    audit_log!(
        "allocation_updated",
        actor_id = user.id,
        allocation_id = allocation.id
    );

    Ok(Json(allocation))
}

/// DELETE /api/allocations/{id} - 停用派单 (管理员)
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    ensure_role(&user, ADMIN_ROLES)?;

    allocation_repo::deactivate(&state.pool(), id).await?;

    audit_log!("allocation_deactivated", actor_id = user.id, allocation_id = id);

    Ok(Json(true))
}
