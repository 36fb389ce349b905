//! HTTP status for each error code

use http::StatusCode;

use super::codes::ErrorCode;

impl ErrorCode {
    /// Status the response carries when this code is returned
    ///
    /// Codes without an explicit mapping are client mistakes and fall
    /// through to 400.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound
            | Self::EmployeeNotFound
            | Self::UserNotFound
            | Self::ManagerNotFound
            | Self::TimesheetNotFound
            | Self::WeeklyTimesheetNotFound
            | Self::LeaveRequestNotFound
            | Self::CustomerNotFound
            | Self::ProjectNotFound
            | Self::AllocationNotFound
            | Self::DocumentNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists
            | Self::EmployeeCodeExists
            | Self::EmployeeEmailExists
            | Self::UsernameExists
            | Self::TimesheetAlreadyApproved
            | Self::TimesheetAlreadyRejected
            | Self::WeeklyTimesheetDuplicate
            | Self::LeaveAlreadyApproved
            | Self::LeaveAlreadyRejected
            | Self::CustomerNameExists
            | Self::ProjectCodeExists
            | Self::DocumentAlreadyReviewed => StatusCode::CONFLICT,

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::SessionExpired
            | Self::AccountDisabled
            | Self::RefreshTokenInvalid => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::NotRecordOwner
            | Self::CannotModifySuperUser => StatusCode::FORBIDDEN,

            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // Transient faults, the client may retry
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::EncryptionFailed
            | Self::DecryptionFailed
            | Self::BackupFailed
            | Self::FileStorageFailed
            | Self::MailNotConfigured
            | Self::MailSendFailed => StatusCode::INTERNAL_SERVER_ERROR,

            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorCode::Success, StatusCode::OK),
            // lookups that missed
            (ErrorCode::NotFound, StatusCode::NOT_FOUND),
            (ErrorCode::EmployeeNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::TimesheetNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::DocumentNotFound, StatusCode::NOT_FOUND),
            // uniqueness and state conflicts
            (ErrorCode::AlreadyExists, StatusCode::CONFLICT),
            (ErrorCode::UsernameExists, StatusCode::CONFLICT),
            (ErrorCode::TimesheetAlreadyApproved, StatusCode::CONFLICT),
            (ErrorCode::ProjectCodeExists, StatusCode::CONFLICT),
            // missing or bad credentials
            (ErrorCode::NotAuthenticated, StatusCode::UNAUTHORIZED),
            (ErrorCode::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ErrorCode::TokenExpired, StatusCode::UNAUTHORIZED),
            (ErrorCode::RefreshTokenInvalid, StatusCode::UNAUTHORIZED),
            // authenticated but not allowed
            (ErrorCode::PermissionDenied, StatusCode::FORBIDDEN),
            (ErrorCode::NotRecordOwner, StatusCode::FORBIDDEN),
            (ErrorCode::AdminRequired, StatusCode::FORBIDDEN),
            // oversized upload
            (ErrorCode::FileTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            // retryable
            (ErrorCode::NetworkError, StatusCode::SERVICE_UNAVAILABLE),
            (ErrorCode::TimeoutError, StatusCode::SERVICE_UNAVAILABLE),
            // server faults
            (ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::DatabaseError, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::MailSendFailed, StatusCode::INTERNAL_SERVER_ERROR),
            // everything else is the caller's problem
            (ErrorCode::ValidationFailed, StatusCode::BAD_REQUEST),
            (ErrorCode::TimesheetDuplicate, StatusCode::BAD_REQUEST),
            (ErrorCode::AllocationDuplicate, StatusCode::BAD_REQUEST),
            (ErrorCode::InvalidHoursFormat, StatusCode::BAD_REQUEST),
            (ErrorCode::ResetTokenInvalid, StatusCode::BAD_REQUEST),
        ];
        for (code, expected) in cases {
            assert_eq!(code.http_status(), expected, "{code:?}");
        }
    }
}
