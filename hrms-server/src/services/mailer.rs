//! 邮件通知服务
//!
//! 通过 SMTP 发送审批结果和密码重置邮件。
//! 未配置 `SMTP_HOST` 时降级为日志输出，业务流程不受影响。

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use shared::models::ApprovalStatus;

use crate::core::Config;

/// SMTP 邮件服务
///
/// 所有发送方法都是尽力而为：发送失败只记日志，不向调用方传播错误，
/// 审批和重置流程不因邮件故障而失败。
#[derive(Debug, Clone)]
pub struct MailerService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    base_url: String,
}

impl MailerService {
    /// 根据配置创建邮件服务
    pub fn new(config: &Config) -> Self {
        let transport = match &config.smtp_host {
            Some(host) => match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                Ok(builder) => {
                    let mut builder = builder.port(config.smtp_port);
                    if !config.smtp_username.is_empty() {
                        builder = builder.credentials(Credentials::new(
                            config.smtp_username.clone(),
                            config.smtp_password.clone(),
                        ));
                    }
                    tracing::info!(host = %host, port = config.smtp_port, "SMTP mailer enabled");
                    Some(builder.build())
                }
                Err(e) => {
                    tracing::error!(host = %host, error = %e, "SMTP relay setup failed, mail disabled");
                    None
                }
            },
            None => {
                tracing::info!("SMTP_HOST not set, mail notifications are logged only");
                None
            }
        };

        Self {
            transport,
            from: config.smtp_from.clone(),
            base_url: config.app_base_url.clone(),
        }
    }

    /// 创建禁用的邮件服务 (测试用)
    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: "hrms@localhost".to_string(),
            base_url: "http://localhost:3000".to_string(),
        }
    }

    /// 邮件发送是否启用
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    async fn send(&self, to: &str, subject: &str, body: String) {
        let Some(transport) = &self.transport else {
            tracing::info!(to = %to, subject = %subject, "Mail disabled, notification logged");
            return;
        };

        let from: Mailbox = match self.from.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(from = %self.from, error = %e, "Invalid SMTP_FROM address");
                return;
            }
        };
        let to_mailbox: Mailbox = match to.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(to = %to, error = %e, "Invalid recipient address, mail skipped");
                return;
            }
        };

        let message = match Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .body(body)
        {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build mail message");
                return;
            }
        };

        match transport.send(message).await {
            Ok(_) => tracing::info!(to = %to, subject = %subject, "Mail sent"),
            Err(e) => tracing::warn!(to = %to, subject = %subject, error = %e, "Mail send failed"),
        }
    }

    /// 工时审批结果通知
    pub async fn send_timesheet_decision(
        &self,
        to: &str,
        employee_name: &str,
        work_date: &str,
        status: ApprovalStatus,
        comment: Option<&str>,
    ) {
        let subject = format!("Timesheet for {} {}", work_date, status_word(status));
        let body = decision_body(
            employee_name,
            &format!("your timesheet for {}", work_date),
            status,
            comment,
        );
        self.send(to, &subject, body).await;
    }

    /// 请假审批结果通知
    pub async fn send_leave_decision(
        &self,
        to: &str,
        employee_name: &str,
        start_date: &str,
        end_date: &str,
        status: ApprovalStatus,
        comment: Option<&str>,
    ) {
        let subject = format!("Leave request {}", status_word(status));
        let body = decision_body(
            employee_name,
            &format!("your leave request ({} to {})", start_date, end_date),
            status,
            comment,
        );
        self.send(to, &subject, body).await;
    }

    /// 证件审核结果通知
    pub async fn send_document_decision(
        &self,
        to: &str,
        employee_name: &str,
        document_type: &str,
        status: ApprovalStatus,
        comment: Option<&str>,
    ) {
        let subject = format!("Document {} {}", document_type, status_word(status));
        let body = decision_body(
            employee_name,
            &format!("your document \"{}\"", document_type),
            status,
            comment,
        );
        self.send(to, &subject, body).await;
    }

    /// 密码重置邮件，带一次性令牌链接
    pub async fn send_password_reset(&self, to: &str, username: &str, token: &str) {
        let link = format!("{}/reset-password?token={}", self.base_url, token);
        let subject = "Password reset request";
        let body = format!(
            "Hello {},\n\nA password reset was requested for your account.\n\
             Use the link below within its validity window to choose a new password:\n\n{}\n\n\
             If you did not request this, you can ignore this email.\n",
            username, link
        );
        self.send(to, subject, body).await;
    }
}

fn status_word(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Approved => "approved",
        ApprovalStatus::Rejected => "rejected",
        ApprovalStatus::Requested => "submitted",
    }
}

fn decision_body(
    employee_name: &str,
    what: &str,
    status: ApprovalStatus,
    comment: Option<&str>,
) -> String {
    let mut body = format!(
        "Hello {},\n\nThis is to let you know that {} has been {}.\n",
        employee_name,
        what,
        status_word(status)
    );
    if let Some(comment) = comment.filter(|c| !c.is_empty()) {
        body.push_str(&format!("\nReviewer comment: {}\n", comment));
    }
    body.push_str("\nThis is an automated notification.\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_mailer() {
        let mailer = MailerService::disabled();
        assert!(!mailer.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_send_is_noop() {
        let mailer = MailerService::disabled();
        mailer
            .send_timesheet_decision(
                "jdoe@example.com",
                "John Doe",
                "2024-03-11",
                ApprovalStatus::Approved,
                Some("Looks good"),
            )
            .await;
    }

    #[test]
    fn test_decision_body_includes_comment() {
        let body = decision_body(
            "John",
            "your leave request (2024-03-11 to 2024-03-12)",
            ApprovalStatus::Rejected,
            Some("Project deadline"),
        );
        assert!(body.contains("rejected"));
        assert!(body.contains("Project deadline"));

        let without = decision_body("John", "your timesheet", ApprovalStatus::Approved, None);
        assert!(!without.contains("Reviewer comment"));
    }
}
