//! 员工档案处理函数
//!
//! PII 字段 (PAN/Aadhaar/银行账号/PF 号) 在库中只存加密信封：
//! - 写入：HR 提交明文，处理函数加密后落库
//! - 读取：`employees:manage` 或本人可见明文，其余授权读者只见掩码

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::api::{ensure_permission, ensure_role, load_employee_id, page_bounds};
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::auth::permissions::{APPROVER_ROLES, HR_ROLES};
use crate::core::ServerState;
use crate::db::repository::employee::EncryptedPii;
use crate::db::repository::{employee as employee_repo, resource_allocation as allocation_repo};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_date, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Employee, EmployeeCreate, EmployeeSummary, EmployeeUpdate};

/// 无明文权限的读者看到的 PII 占位值
const PII_MASK: &str = "****";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// 删除请求的结果：有活跃派单的员工只停用不删除
#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
    pub deactivated: bool,
}

fn validate_create(payload: &EmployeeCreate) -> AppResult<()> {
    validate_required_text(&payload.employee_code, "employee_code", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.first_name, "first_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.last_name, "last_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_date(&payload.date_of_joining, "date_of_joining")?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.designation, "designation", MAX_NAME_LEN)?;
    validate_optional_text(&payload.department, "department", MAX_NAME_LEN)?;
    Ok(())
}

fn validate_update(payload: &EmployeeUpdate) -> AppResult<()> {
    if let Some(first_name) = &payload.first_name {
        validate_required_text(first_name, "first_name", MAX_NAME_LEN)?;
    }
    if let Some(last_name) = &payload.last_name {
        validate_required_text(last_name, "last_name", MAX_NAME_LEN)?;
    }
    if let Some(email) = &payload.email {
        validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    }
    if let Some(date) = &payload.date_of_joining {
        validate_date(date, "date_of_joining")?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.designation, "designation", MAX_NAME_LEN)?;
    validate_optional_text(&payload.department, "department", MAX_NAME_LEN)?;
    Ok(())
}

/// 掩码代替明文：仅标记信封存在与否
fn mask_pii(employee: &mut Employee) {
    employee.pan = employee.pan_enc.as_ref().map(|_| PII_MASK.to_string());
    employee.aadhaar = employee.aadhaar_enc.as_ref().map(|_| PII_MASK.to_string());
    employee.bank_account = employee
        .bank_account_enc
        .as_ref()
        .map(|_| PII_MASK.to_string());
    employee.pf_number = employee.pf_number_enc.as_ref().map(|_| PII_MASK.to_string());
}

/// GET /api/employees - 列出员工 (不含 PII 列)
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<EmployeeSummary>>> {
    ensure_permission(&user, "employees:read")?;
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let employees =
        employee_repo::find_all(&state.pool(), query.include_inactive, limit, offset).await?;
    Ok(Json(employees))
}

/// GET /api/employees/my-team - 当前经理的直属下属
pub async fn my_team(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<EmployeeSummary>>> {
    ensure_role(&user, APPROVER_ROLES)?;
    let employee_id = load_employee_id(&state, &user).await?;
    let team = employee_repo::find_by_manager(&state.pool(), employee_id).await?;
    Ok(Json(team))
}

/// GET /api/employees/{id} - 查询员工档案
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let own_record = match load_employee_id(&state, &user).await {
        Ok(employee_id) => employee_id == id,
        Err(_) => false,
    };
    if !own_record {
        ensure_permission(&user, "employees:read")?;
    }

    let mut employee = employee_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {id}")))?;

    if own_record || user.has_permission("employees:manage") {
        state.crypto().decrypt_employee(&mut employee)?;
    } else {
        mask_pii(&mut employee);
    }

    Ok(Json(employee))
}

/// POST /api/employees - 创建员工档案 (HR)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    ensure_role(&user, HR_ROLES)?;
    validate_create(&payload)?;

    if let Some(manager_id) = payload.manager_id
        && employee_repo::find_by_id(&state.pool(), manager_id)
            .await?
            .is_none()
    {
        return Err(AppError::validation(format!(
            "Manager {manager_id} does not exist"
        )));
    }

    let pii = state.crypto().encrypt_employee_pii(&payload)?;
    let mut employee = employee_repo::create(&state.pool(), &payload, pii).await?;
    state.crypto().decrypt_employee(&mut employee)?;

    audit_log!(
        "employee_created",
        actor_id = user.id,
        employee_id = employee.id,
        employee_code = employee.employee_code.clone()
    );

    Ok(Json(employee))
}

/// PUT /api/employees/{id} - 更新员工档案 (HR)
///
/// 只加密本次提交的 PII 字段，缺省字段由 SQL COALESCE 保留原信封。
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    ensure_role(&user, HR_ROLES)?;
    validate_update(&payload)?;

    let encrypt = |value: &Option<String>| -> AppResult<Option<String>> {
        value
            .as_deref()
            .map(|v| state.crypto().encrypt_field(v))
            .transpose()
    };
    let pii = EncryptedPii {
        pan_enc: encrypt(&payload.pan)?,
        aadhaar_enc: encrypt(&payload.aadhaar)?,
        bank_account_enc: encrypt(&payload.bank_account)?,
        pf_number_enc: encrypt(&payload.pf_number)?,
    };

    let mut employee = employee_repo::update(&state.pool(), id, &payload, pii).await?;
    state.crypto().decrypt_employee(&mut employee)?;

    audit_log!(
        "employee_updated",
        actor_id = user.id,
        employee_id = employee.id,
        employee_code = employee.employee_code.clone()
    );

    Ok(Json(employee))
}

/// DELETE /api/employees/{id} - 删除或停用员工 (HR)
///
/// 仍有活跃派单的员工只标记停用，保住派单和工时的引用。
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteOutcome>> {
    ensure_role(&user, HR_ROLES)?;

    let active_allocations = allocation_repo::count_active_by_employee(&state.pool(), id).await?;
    let outcome = if active_allocations > 0 {
        employee_repo::set_active(&state.pool(), id, false).await?;
        DeleteOutcome {
            deleted: false,
            deactivated: true,
        }
    } else {
        employee_repo::delete(&state.pool(), id).await?;
        DeleteOutcome {
            deleted: true,
            deactivated: false,
        }
    };

    audit_log!(
        "employee_removed",
        actor_id = user.id,
        employee_id = id,
        deleted = outcome.deleted,
        deactivated = outcome.deactivated
    );

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create() -> EmployeeCreate {
        EmployeeCreate {
            employee_code: "EMP001".into(),
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha.rao@example.com".into(),
            phone: None,
            designation: None,
            department: None,
            manager_id: None,
            director_id: None,
            date_of_joining: "2024-01-15".into(),
            pan: None,
            aadhaar: None,
            bank_account: None,
            pf_number: None,
        }
    }

    #[test]
    fn test_validate_create() {
        assert!(validate_create(&sample_create()).is_ok());

        let mut bad_date = sample_create();
        bad_date.date_of_joining = "15/01/2024".into();
        assert!(validate_create(&bad_date).is_err());

        let mut blank_name = sample_create();
        blank_name.first_name = "  ".into();
        assert!(validate_create(&blank_name).is_err());
    }

    #[test]
    fn test_mask_pii_only_marks_present_envelopes() {
        let mut employee = Employee {
            id: 1,
            employee_code: "EMP001".into(),
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha.rao@example.com".into(),
            phone: None,
            designation: None,
            department: None,
            manager_id: None,
            director_id: None,
            date_of_joining: "2024-01-15".into(),
            pan_enc: Some("envelope".into()),
            aadhaar_enc: None,
            bank_account_enc: Some("envelope".into()),
            pf_number_enc: None,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
            pan: None,
            aadhaar: None,
            bank_account: None,
            pf_number: None,
        };

        mask_pii(&mut employee);
        assert_eq!(employee.pan.as_deref(), Some(PII_MASK));
        assert_eq!(employee.aadhaar, None);
        assert_eq!(employee.bank_account.as_deref(), Some(PII_MASK));
        assert_eq!(employee.pf_number, None);
    }
}
