//! 项目处理函数

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
    customer as customer_repo, project as project_repo,
    resource_allocation as allocation_repo,
};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_date, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Project, ProjectCreate, ProjectUpdate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

fn validate_date_range(
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

/// GET /api/projects - 列出项目 (含客户名)
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Project>>> {
    ensure_permission(&user, "resources:read")?;
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let projects = project_repo::find_all(&state.pool(), limit, offset).await?;
    Ok(Json(projects))
}

/// GET /api/projects/by-customer/{customer_id} - 某客户名下的项目
pub async fn list_by_customer(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(customer_id): Path<i64>,
) -> AppResult<Json<Vec<Project>>> {
    ensure_permission(&user, "resources:read")?;
    let projects = project_repo::find_by_customer(&state.pool(), customer_id).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id} - 查询单个项目
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Project>> {
    ensure_permission(&user, "resources:read")?;
    let project = project_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Project {id}")))?;
    Ok(Json(project))
}

/// POST /api/projects - 创建项目 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ProjectCreate>,
) -> AppResult<Json<Project>> {
    ensure_role(&user, ADMIN_ROLES)?;
    validate_required_text(&payload.project_code, "project_code", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_date_range(&payload.start_date, &payload.end_date)?;

    if customer_repo::find_by_id(&state.pool(), payload.customer_id)
        .await?
        .is_none()
    {
        return Err(AppError::validation(format!(
            "Customer {} does not exist",
            payload.customer_id
        )));
    }

    let project = project_repo::create(&state.pool(), &payload).await?;

    audit_log!(
        "project_created",
        actor_id = user.id,
        project_id = project.id,
        project_code = project.project_code.clone(),
        customer_id = project.customer_id
    );

    Ok(Json(project))
}

/// PUT /api/projects/{id} - 更新项目 (管理员)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectUpdate>,
) -> AppResult<Json<Project>> {
    ensure_role(&user, ADMIN_ROLES)?;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_date_range(&payload.start_date, &payload.end_date)?;

    let project = project_repo::update(&state.pool(), id, &payload).await?;

    audit_log!(
        "project_updated",
        actor_id = user.id,
        project_id = project.id,
        project_code = project.project_code.clone()
    );

    Ok(Json(project))
}

/// DELETE /api/projects/{id} - 删除项目 (管理员)
///
/// 还有活跃派单的项目不允许删除。
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    ensure_role(&user, ADMIN_ROLES)?;

    let allocations = allocation_repo::count_active_by_project(&state.pool(), id).await?;
    if allocations > 0 {
        return Err(AppError::validation(format!(
            "Project {id} still has {allocations} active allocation(s)"
        )));
    }

    project_repo::delete(&state.pool(), id).await?;

    audit_log!("project_deleted", actor_id = user.id, project_id = id);

    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range() {
        assert!(validate_date_range(&None, &None).is_ok());
        assert!(
            validate_date_range(&Some("2024-01-01".into()), &Some("2024-06-30".into())).is_ok()
        );
        assert!(
            validate_date_range(&Some("2024-06-30".into()), &Some("2024-01-01".into())).is_err()
        );
        assert!(validate_date_range(&Some("bad".into()), &None).is_err());
    }
}
