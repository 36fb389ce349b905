//! 人事主流程集成测试
//!
//! 覆盖员工档案 PII 加解密、工时提交与审批、周工时折算、
//! 请假申请和证件文档的端到端行为。

mod common;

use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use common::{create_employee, login, request, seed_user, setup};
use hrms_server::db::repository::employee as employee_repo;

#[tokio::test]
async fn employee_pii_is_encrypted_and_masked() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let (admin_token, _) = login(&env.app, "admin").await;

    let (status, body) = request(
        &env.app,
        "POST",
        "/api/employees",
        Some(&admin_token),
        Some(json!({
            "employee_code": "EMP001",
            "first_name": "Asha",
            "last_name": "Rao",
            "email": "asha@example.com",
            "designation": "Engineer",
            "date_of_joining": "2024-01-15",
            "pan": "ABCDE1234F",
            "aadhaar": "123412341234",
            "bank_account": "00112233445566"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let emp_id = body["id"].as_i64().expect("employee id");

    // 管理员响应里是解密后的明文，密文字段不序列化
    assert_eq!(body["pan"], "ABCDE1234F");
    assert_eq!(body["aadhaar"], "123412341234");
    assert!(body.get("pan_enc").is_none());

    // 数据库存的是信封密文
    let row = employee_repo::find_by_id(&env.state.pool(), emp_id)
        .await
        .expect("query employee")
        .expect("employee row");
    let pan_enc = row.pan_enc.expect("encrypted pan");
    assert_ne!(pan_enc, "ABCDE1234F");
    assert_eq!(
        env.state.crypto().decrypt_field(&pan_enc).expect("decrypt"),
        "ABCDE1234F"
    );

    // 本人可以看到自己的明文
    seed_user(&env.state, "asha", "employee", Some(emp_id)).await;
    let (own_token, _) = login(&env.app, "asha").await;
    let (status, body) = request(
        &env.app,
        "GET",
        &format!("/api/employees/{emp_id}"),
        Some(&own_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pan"], "ABCDE1234F");

    // 经理只有 employees:read，敏感字段被掩码
    seed_user(&env.state, "boss", "manager", None).await;
    let (mgr_token, _) = login(&env.app, "boss").await;
    let (status, body) = request(
        &env.app,
        "GET",
        &format!("/api/employees/{emp_id}"),
        Some(&mgr_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pan"], "****");
    assert_eq!(body["bank_account"], "****");
    // 没录入过的字段保持空，不掩码
    assert!(body["pf_number"].is_null());

    // 普通员工没有 employees:read，不能看别人的档案
    seed_user(&env.state, "peer", "employee", None).await;
    let (peer_token, _) = login(&env.app, "peer").await;
    let (status, _) = request(
        &env.app,
        "GET",
        &format!("/api/employees/{emp_id}"),
        Some(&peer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn timesheet_submit_and_approval_flow() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let (admin_token, _) = login(&env.app, "admin").await;
    let emp_id = create_employee(&env.app, &admin_token, "EMP010", "dev@example.com").await;
    seed_user(&env.state, "dev", "employee", Some(emp_id)).await;
    let boss_id = seed_user(&env.state, "boss", "manager", None).await;
    let (dev_token, _) = login(&env.app, "dev").await;

    let submit = json!({
        "work_date": "2025-03-03",
        "tasks": [
            {"description": "Implement payroll export", "hours": "04:30"},
            {"description": "Code review", "hours": "03:30"}
        ]
    });
    let (status, body) = request(
        &env.app,
        "POST",
        "/api/timesheets",
        Some(&dev_token),
        Some(submit.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ts_id = body["id"].as_i64().expect("timesheet id");
    assert_eq!(body["employee_id"], emp_id);
    assert_eq!(body["status"], "REQUESTED");
    assert_eq!(body["total_hours"], 8.0);
    assert_eq!(body["tasks"][0]["task_id"], "TASK001");
    assert_eq!(body["tasks"][1]["task_id"], "TASK002");

    // 同一天不能重复提交
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/timesheets",
        Some(&dev_token),
        Some(submit),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 工时必须是 HH:MM
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/timesheets",
        Some(&dev_token),
        Some(json!({
            "work_date": "2025-03-04",
            "tasks": [{"description": "Standup", "hours": "8.5"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 员工角色进不了审批路由
    let (status, _) = request(
        &env.app,
        "POST",
        &format!("/api/timesheets/{ts_id}/approve"),
        Some(&dev_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 经理审批通过
    let (boss_token, _) = login(&env.app, "boss").await;
    let (status, body) = request(
        &env.app,
        "POST",
        &format!("/api/timesheets/{ts_id}/approve"),
        Some(&boss_token),
        Some(json!({"comment": "looks good"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");
    assert_eq!(body["approver_id"], boss_id);
    assert_eq!(body["approver_comment"], "looks good");
    assert!(body["approved_at"].is_string());

    // 已定稿的不能再审、不能再改、不能撤回
    let (status, _) = request(
        &env.app,
        "POST",
        &format!("/api/timesheets/{ts_id}/reject"),
        Some(&boss_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &env.app,
        "PUT",
        &format!("/api/timesheets/{ts_id}"),
        Some(&dev_token),
        Some(json!({"tasks": [{"description": "Rewrite", "hours": "01:00"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &env.app,
        "DELETE",
        &format!("/api/timesheets/{ts_id}"),
        Some(&dev_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_approval_reports_each_item() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let (admin_token, _) = login(&env.app, "admin").await;
    let emp_id = create_employee(&env.app, &admin_token, "EMP011", "bulk@example.com").await;
    seed_user(&env.state, "dev", "employee", Some(emp_id)).await;
    seed_user(&env.state, "boss", "manager", None).await;
    let (dev_token, _) = login(&env.app, "dev").await;

    let mut ids = Vec::new();
    for date in ["2025-03-05", "2025-03-06"] {
        let (status, body) = request(
            &env.app,
            "POST",
            "/api/timesheets",
            Some(&dev_token),
            Some(json!({
                "work_date": date,
                "tasks": [{"description": "Sprint work", "hours": "08:00"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["id"].as_i64().expect("timesheet id"));
    }

    let (boss_token, _) = login(&env.app, "boss").await;

    // REQUESTED 不是终态，不能作为批量目标
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/timesheets/bulk-approval",
        Some(&boss_token),
        Some(json!({"ids": ids, "status": "REQUESTED"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &env.app,
        "POST",
        "/api/timesheets/bulk-approval",
        Some(&boss_token),
        Some(json!({"ids": [ids[0], ids[1], 9999], "status": "APPROVED", "comment": "batch"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let outcomes = body.as_array().expect("outcomes");
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["ok"], true);
    assert_eq!(outcomes[1]["ok"], true);
    assert_eq!(outcomes[2]["ok"], false);
    assert!(outcomes[2]["error"].is_string());
}

#[tokio::test]
async fn approved_daily_entries_roll_up_into_weekly() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let (admin_token, _) = login(&env.app, "admin").await;
    let emp_id = create_employee(&env.app, &admin_token, "EMP012", "week@example.com").await;
    seed_user(&env.state, "dev", "employee", Some(emp_id)).await;
    let (dev_token, _) = login(&env.app, "dev").await;

    // 2025-03-03 是周一
    let days = [("2025-03-03", "04:30", "03:30"), ("2025-03-04", "06:00", "")];
    let mut ids = Vec::new();
    for (date, h1, h2) in days {
        let mut tasks = vec![json!({"description": "Feature work", "hours": h1})];
        if !h2.is_empty() {
            tasks.push(json!({"description": "Review", "hours": h2}));
        }
        let (status, body) = request(
            &env.app,
            "POST",
            "/api/timesheets",
            Some(&dev_token),
            Some(json!({"work_date": date, "tasks": tasks})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["id"].as_i64().expect("timesheet id"));
    }

    for id in &ids {
        let (status, _) = request(
            &env.app,
            "POST",
            &format!("/api/timesheets/{id}/approve"),
            Some(&admin_token),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // 两天分别折算；重跑幂等
    for date in ["2025-03-03", "2025-03-04", "2025-03-04"] {
        let (status, body) = request(
            &env.app,
            "POST",
            "/api/timesheets/weekly/sync",
            Some(&admin_token),
            Some(json!({"date": date})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], 1);
    }

    let (status, body) = request(
        &env.app,
        "GET",
        "/api/timesheets/weekly",
        Some(&dev_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let weeks = body.as_array().expect("weekly rows");
    assert_eq!(weeks.len(), 1);
    let week = &weeks[0];
    assert_eq!(week["week_start"], "2025-03-03");
    assert_eq!(week["week_end"], "2025-03-09");
    assert_eq!(week["status"], "REQUESTED");
    assert_eq!(week["total_hours"], 14.0);
    let entries = week["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["work_date"], "2025-03-03");
    assert_eq!(entries[0]["total_hours"], 8.0);
    assert_eq!(entries[1]["work_date"], "2025-03-04");
    assert_eq!(entries[1]["total_hours"], 6.0);
}

#[tokio::test]
async fn leave_request_lifecycle() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let (admin_token, _) = login(&env.app, "admin").await;
    let emp_id = create_employee(&env.app, &admin_token, "EMP013", "leave@example.com").await;
    seed_user(&env.state, "dev", "employee", Some(emp_id)).await;
    let boss_id = seed_user(&env.state, "boss", "manager", None).await;
    let (dev_token, _) = login(&env.app, "dev").await;

    // 缺省按日期跨度计天数
    let (status, body) = request(
        &env.app,
        "POST",
        "/api/leaves",
        Some(&dev_token),
        Some(json!({
            "leave_type": "CASUAL",
            "start_date": "2025-04-01",
            "end_date": "2025-04-03",
            "reason": "Family function",
            "approvers": [boss_id]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let leave_id = body["id"].as_i64().expect("leave id");
    assert_eq!(body["day_count"], 3.0);
    assert_eq!(body["status"], "REQUESTED");
    assert_eq!(body["approvers"][0], boss_id);

    // 半天假
    let (status, body) = request(
        &env.app,
        "POST",
        "/api/leaves",
        Some(&dev_token),
        Some(json!({
            "leave_type": "SICK",
            "start_date": "2025-04-07",
            "end_date": "2025-04-07",
            "day_count": 0.5,
            "reason": "Clinic visit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let half_day_id = body["id"].as_i64().expect("leave id");
    assert_eq!(body["day_count"], 0.5);

    // 天数不能超过日期跨度
    let (status, _) = request(
        &env.app,
        "POST",
        "/api/leaves",
        Some(&dev_token),
        Some(json!({
            "leave_type": "CASUAL",
            "start_date": "2025-04-10",
            "end_date": "2025-04-10",
            "day_count": 2.0,
            "reason": "Too long"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 经理驳回
    let (boss_token, _) = login(&env.app, "boss").await;
    let (status, body) = request(
        &env.app,
        "POST",
        &format!("/api/leaves/{leave_id}/reject"),
        Some(&boss_token),
        Some(json!({"comment": "Project deadline"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REJECTED");
    assert_eq!(body["approver_id"], boss_id);

    // 已定稿的不能撤回
    let (status, _) = request(
        &env.app,
        "DELETE",
        &format!("/api/leaves/{leave_id}"),
        Some(&dev_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 待审的可以撤回
    let (status, body) = request(
        &env.app,
        "DELETE",
        &format!("/api/leaves/{half_day_id}"),
        Some(&dev_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, true);
}

const BOUNDARY: &str = "hrms-test-boundary";

fn multipart_upload(
    token: &str,
    document_type: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"document_type\"\r\n\r\n");
    body.extend_from_slice(document_type.as_bytes());
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/documents")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("upload request")
}

#[tokio::test]
async fn document_upload_review_and_download() {
    let env = setup().await;
    seed_user(&env.state, "admin", "admin", None).await;
    let (admin_token, _) = login(&env.app, "admin").await;
    let emp_id = create_employee(&env.app, &admin_token, "EMP014", "docs@example.com").await;
    seed_user(&env.state, "dev", "employee", Some(emp_id)).await;
    seed_user(&env.state, "hr1", "hr", None).await;
    let (dev_token, _) = login(&env.app, "dev").await;

    let pdf: &[u8] = b"%PDF-1.4 integration test payload";
    let upload = multipart_upload(&dev_token, "pan_card", "pan.pdf", "application/pdf", pdf);
    let response = env.app.clone().oneshot(upload).await.expect("upload");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = common::body_bytes(response).await;
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("upload body");
    let doc_id = body["id"].as_i64().expect("document id");
    assert_eq!(body["employee_id"], emp_id);
    assert_eq!(body["document_type"], "pan_card");
    assert_eq!(body["file_name"], "pan.pdf");
    assert_eq!(body["content_type"], "application/pdf");
    assert_eq!(body["file_size"], pdf.len() as i64);
    assert_eq!(body["status"], "REQUESTED");
    // 磁盘上的随机文件名不暴露给客户端
    assert!(body.get("stored_name").is_none());

    // 不支持的文件类型被拒
    let bad = multipart_upload(&dev_token, "pan_card", "pan.txt", "text/plain", b"hello");
    let response = env.app.clone().oneshot(bad).await.expect("upload");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 本人列表里能看到
    let (status, body) = request(&env.app, "GET", "/api/documents", Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("documents").len(), 1);

    // 下载原样取回
    let download = Request::builder()
        .method("GET")
        .uri(format!("/api/documents/{doc_id}/download"))
        .header(header::AUTHORIZATION, format!("Bearer {dev_token}"))
        .body(Body::empty())
        .expect("download request");
    let response = env.app.clone().oneshot(download).await.expect("download");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("content type"),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .expect("disposition");
    assert!(disposition.contains("pan.pdf"));
    assert_eq!(common::body_bytes(response).await, pdf);

    // HR 审核通过
    let (hr_token, _) = login(&env.app, "hr1").await;
    let (status, body) = request(
        &env.app,
        "POST",
        &format!("/api/documents/{doc_id}/approve"),
        Some(&hr_token),
        Some(json!({"comment": "Verified"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    // 审核定稿后本人不能删，HR 可以
    let (status, _) = request(
        &env.app,
        "DELETE",
        &format!("/api/documents/{doc_id}"),
        Some(&dev_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &env.app,
        "DELETE",
        &format!("/api/documents/{doc_id}"),
        Some(&hr_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, true);
}
