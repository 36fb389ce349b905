//! 客户处理函数

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
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

fn validate_contact_fields(
    contact_person: &Option<String>,
    contact_email: &Option<String>,
    contact_phone: &Option<String>,
    address: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(contact_person, "contact_person", MAX_NAME_LEN)?;
    validate_optional_text(contact_email, "contact_email", MAX_EMAIL_LEN)?;
    validate_optional_text(contact_phone, "contact_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(address, "address", MAX_ADDRESS_LEN)?;
    Ok(())
}

/// GET /api/customers - 列出客户
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    ensure_permission(&user, "resources:read")?;
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let customers = customer_repo::find_all(&state.pool(), limit, offset).await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id} - 查询单个客户
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    ensure_permission(&user, "resources:read")?;
    let customer = customer_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id}")))?;
    Ok(Json(customer))
}

/// POST /api/customers - 创建客户 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    ensure_role(&user, ADMIN_ROLES)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_contact_fields(
        &payload.contact_person,
        &payload.contact_email,
        &payload.contact_phone,
        &payload.address,
    )?;

    let customer = customer_repo::create(&state.pool(), &payload).await?;

    audit_log!(
        "customer_created",
        actor_id = user.id,
        customer_id = customer.id,
        name = customer.name.clone()
    );

    Ok(Json(customer))
}

/// PUT /api/customers/{id} - 更新客户 (管理员)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    ensure_role(&user, ADMIN_ROLES)?;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_contact_fields(
        &payload.contact_person,
        &payload.contact_email,
        &payload.contact_phone,
        &payload.address,
    )?;

    let customer = customer_repo::update(&state.pool(), id, &payload).await?;

    audit_log!(
        "customer_updated",
        actor_id = user.id,
        customer_id = customer.id,
        name = customer.name.clone()
    );

    Ok(Json(customer))
}

/// DELETE /api/customers/{id} - 删除客户 (管理员)
///
/// 名下还有项目或活跃派单的客户不允许删除。
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    ensure_role(&user, ADMIN_ROLES)?;

    let projects = project_repo::count_by_customer(&state.pool(), id).await?;
    if projects > 0 {
        return Err(AppError::validation(format!(
            "Customer {id} still owns {projects} project(s)"
        )));
    }
    let allocations = allocation_repo::count_active_by_customer(&state.pool(), id).await?;
    if allocations > 0 {
        return Err(AppError::validation(format!(
            "Customer {id} still has {allocations} active allocation(s)"
        )));
    }

    customer_repo::delete(&state.pool(), id).await?;

    audit_log!("customer_deleted", actor_id = user.id, customer_id = id);

    Ok(Json(true))
}
