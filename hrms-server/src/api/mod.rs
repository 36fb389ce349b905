//! HTTP API 模块
//!
//! 每个资源一个子模块，各自的 `router()` 挂在 `/api/<resource>` 下，
//! 由 [`crate::core::server::build_router`] 合并。
//!
//! # 授权约定
//!
//! - 整个路由树只对一类角色开放时，用 `route_layer(require_role(..))` 统一拦截
//!   (如 `users`、各 approve/reject 子路由)。
//! - 同一路径上读写权限不同时 (如 `GET /api/employees` 对 `POST`)，在处理函数里
//!   用 [`ensure_role`] / [`ensure_permission`] 检查。

pub mod allocations;
pub mod auth;
pub mod customers;
pub mod documents;
pub mod employees;
pub mod health;
pub mod leaves;
pub mod projects;
pub mod timesheets;
pub mod users;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// Default page size for list endpoints
pub(crate) const DEFAULT_PAGE_LIMIT: i32 = 50;

/// Hard ceiling for client-supplied page sizes
pub(crate) const MAX_PAGE_LIMIT: i32 = 200;

/// Clamp optional `?limit=&offset=` query values into sane bounds
pub(crate) fn page_bounds(limit: Option<i32>, offset: Option<i32>) -> (i32, i32) {
    (
        limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

/// 要求当前用户属于指定角色集合，否则 403
pub(crate) fn ensure_role(user: &CurrentUser, roles: &'static [&'static str]) -> AppResult<()> {
    if user.has_role(roles) {
        return Ok(());
    }
    security_log!(
        "WARN",
        "role_denied",
        user_id = user.id,
        username = user.username.clone(),
        user_role = user.role.clone(),
        required_roles = roles.join(",")
    );
    Err(AppError::forbidden(format!(
        "Role not permitted: {}",
        user.role
    )))
}

/// 要求当前用户拥有指定权限 (支持通配符)，否则 403
pub(crate) fn ensure_permission(user: &CurrentUser, permission: &str) -> AppResult<()> {
    if user.has_permission(permission) {
        return Ok(());
    }
    security_log!(
        "WARN",
        "permission_denied",
        user_id = user.id,
        username = user.username.clone(),
        required_permission = permission.to_string()
    );
    Err(AppError::forbidden(format!(
        "Permission denied: {}",
        permission
    )))
}

/// 当前用户关联的员工 ID
///
/// 工时、请假、证件等"本人操作"都以此为主体。
/// 账号未关联员工档案时返回校验错误。
pub(crate) async fn load_employee_id(state: &ServerState, user: &CurrentUser) -> AppResult<i64> {
    let account = user_repo::find_by_id(&state.pool(), user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", user.id)))?;
    account
        .employee_id
        .ok_or_else(|| AppError::validation("Account is not linked to an employee record"))
}
