//! 证件处理函数

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, HeaderValue, header},
};
use uuid::Uuid;

use crate::api::load_employee_id;
use crate::audit_log;
use crate::auth::CurrentUser;
use crate::auth::permissions::HR_ROLES;
use crate::core::ServerState;
use crate::db::repository::{document as document_repo, employee as employee_repo};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{ApprovalDecision, ApprovalStatus, EmployeeDocument};

/// 允许的上传类型 → 存储扩展名
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "application/pdf" => Some("pdf"),
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        _ => None,
    }
}

/// 非 HR 用户只能操作自己档案下的证件
async fn ensure_doc_access(
    state: &ServerState,
    user: &CurrentUser,
    doc: &EmployeeDocument,
) -> AppResult<bool> {
    if user.has_role(HR_ROLES) {
        return Ok(false);
    }
    let own = load_employee_id(state, user).await?;
    if doc.employee_id != own {
        return Err(AppError::forbidden("You can only access your own documents"));
    }
    Ok(true)
}

/// POST /api/documents - 上传证件 (multipart)
///
/// 字段：`file` (必填)、`document_type` (必填)、`employee_id` (HR 代传时可选)。
pub async fn upload(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<EmployeeDocument>> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut document_type: Option<String> = None;
    let mut explicit_employee: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Failed to read file: {e}")))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("document_type") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Malformed field: {e}")))?;
                document_type = Some(text);
            }
            Some("employee_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Malformed field: {e}")))?;
                let id = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::validation("employee_id must be an integer"))?;
                explicit_employee = Some(id);
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::validation("file field is required"))?;
    let document_type =
        document_type.ok_or_else(|| AppError::validation("document_type field is required"))?;
    validate_required_text(&document_type, "document_type", MAX_SHORT_TEXT_LEN)?;

    let employee_id = match explicit_employee {
        Some(id) => {
            if !user.has_role(HR_ROLES) {
                let own = load_employee_id(&state, &user).await?;
                if own != id {
                    return Err(AppError::forbidden(
                        "You can only upload documents for yourself",
                    ));
                }
            }
            id
        }
        None => load_employee_id(&state, &user).await?,
    };

    if employee_repo::find_by_id(&state.pool(), employee_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found(format!("Employee {employee_id}")));
    }

    let ext = extension_for(&content_type).ok_or_else(|| {
        AppError::validation(format!(
            "Unsupported content type: {content_type} (expected PDF, PNG or JPEG)"
        ))
    })?;
    if data.is_empty() {
        return Err(AppError::validation("Uploaded file is empty"));
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::validation(format!(
            "File too large ({} bytes, max {})",
            data.len(),
            state.config.max_upload_bytes
        )));
    }

    let stored_name = format!("{}.{ext}", Uuid::new_v4());
    let dest = state.upload_dir().join(&stored_name);
    tokio::fs::write(&dest, &data)
        .await
        .map_err(|e| AppError::internal(format!("Failed to store upload: {e}")))?;

    let doc = document_repo::create(
        &state.pool(),
        employee_id,
        &document_type,
        &file_name,
        &stored_name,
        &content_type,
        data.len() as i64,
        user.id,
    )
    .await?;

    audit_log!(
        "document_uploaded",
        actor_id = user.id,
        document_id = doc.id,
        employee_id = employee_id,
        document_type = doc.document_type.clone(),
        file_size = doc.file_size
    );

    Ok(Json(doc))
}

/// GET /api/documents - 列出自己的证件
pub async fn list_own(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<EmployeeDocument>>> {
    let employee_id = load_employee_id(&state, &user).await?;
    let docs = document_repo::find_by_employee(&state.pool(), employee_id).await?;
    Ok(Json(docs))
}

/// GET /api/documents/employee/{employee_id} - 列出指定员工的证件 (HR)
pub async fn list_for_employee(
    State(state): State<ServerState>,
    Path(employee_id): Path<i64>,
) -> AppResult<Json<Vec<EmployeeDocument>>> {
    let docs = document_repo::find_by_employee(&state.pool(), employee_id).await?;
    Ok(Json(docs))
}

/// GET /api/documents/{id} - 证件元数据
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<EmployeeDocument>> {
    let doc = document_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id}")))?;
    ensure_doc_access(&state, &user, &doc).await?;
    Ok(Json(doc))
}

/// GET /api/documents/{id}/download - 下载证件文件
pub async fn download(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<(HeaderMap, Vec<u8>)> {
    let doc = document_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id}")))?;
    ensure_doc_access(&state, &user, &doc).await?;

    let path = state.upload_dir().join(&doc.stored_name);
    let data = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal(format!("Failed to read stored file: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&doc.content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    let disposition = format!(
        "attachment; filename=\"{}\"",
        doc.file_name.replace('"', "'")
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::internal(format!("Invalid filename header: {e}")))?,
    );

    Ok((headers, data))
}

/// DELETE /api/documents/{id} - 删除证件
///
/// 本人只能删除尚未审核的；HR 可删任意状态。
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let doc = document_repo::find_by_id(&state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Document {id}")))?;

    let is_owner = ensure_doc_access(&state, &user, &doc).await?;
    if is_owner && doc.status.is_final() {
        return Err(AppError::validation(
            "Reviewed documents can only be removed by HR",
        ));
    }

    document_repo::delete(&state.pool(), id).await?;

    // 文件清理尽力而为，孤儿文件不影响接口结果
    let _ = tokio::fs::remove_file(state.upload_dir().join(&doc.stored_name)).await;

    audit_log!(
        "document_deleted",
        actor_id = user.id,
        document_id = id,
        employee_id = doc.employee_id
    );

    Ok(Json(true))
}

async fn decide(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
    status: ApprovalStatus,
    comment: Option<&str>,
) -> AppResult<EmployeeDocument> {
    let doc = document_repo::set_status(&state.pool(), id, status, user.id, comment).await?;

    audit_log!(
        "document_reviewed",
        actor_id = user.id,
        document_id = id,
        employee_id = doc.employee_id,
        status = status.as_str()
    );

    if let Some(emp) = employee_repo::find_by_id(&state.pool(), doc.employee_id).await? {
        state
            .mailer()
            .send_document_decision(
                &emp.email,
                &format!("{} {}", emp.first_name, emp.last_name),
                &doc.document_type,
                status,
                comment,
            )
            .await;
    }

    Ok(doc)
}

/// POST /api/documents/{id}/approve - 通过证件审核 (HR)
pub async fn approve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> AppResult<Json<EmployeeDocument>> {
    let doc = decide(
        &state,
        &user,
        id,
        ApprovalStatus::Approved,
        decision.comment.as_deref(),
    )
    .await?;
    Ok(Json(doc))
}

/// POST /api/documents/{id}/reject - 驳回证件审核 (HR)
pub async fn reject(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(decision): Json<ApprovalDecision>,
) -> AppResult<Json<EmployeeDocument>> {
    let doc = decide(
        &state,
        &user,
        id,
        ApprovalStatus::Rejected,
        decision.comment.as_deref(),
    )
    .await?;
    Ok(Json(doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_allowed_types() {
        assert_eq!(extension_for("application/pdf"), Some("pdf"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("application/zip"), None);
        assert_eq!(extension_for("text/html"), None);
    }
}
