//! Unified error codes for the HRMS backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Employee errors
//! - 4xxx: Timesheet errors
//! - 5xxx: Leave errors
//! - 6xxx: Resource (customer/project/allocation) errors
//! - 7xxx: Document errors
//! - 8xxx: Notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Session has expired
    SessionExpired = 1005,
    /// Account is disabled
    AccountDisabled = 1006,
    /// Refresh token missing or unknown
    RefreshTokenInvalid = 1007,
    /// Password reset token invalid or already consumed
    ResetTokenInvalid = 1008,
    /// Password reset token expired
    ResetTokenExpired = 1009,
    /// Password too short
    PasswordTooShort = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Caller does not own the target record
    NotRecordOwner = 2004,
    /// Cannot modify the super user account
    CannotModifySuperUser = 2005,

    // ==================== 3xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 3001,
    /// Employee code already exists
    EmployeeCodeExists = 3002,
    /// Employee email already exists
    EmployeeEmailExists = 3003,
    /// Employee is inactive
    EmployeeInactive = 3004,
    /// Employee has active resource allocations
    EmployeeHasAllocations = 3005,
    /// User account not found
    UserNotFound = 3006,
    /// Username already exists
    UsernameExists = 3007,
    /// Referenced manager or director not found
    ManagerNotFound = 3008,

    // ==================== 4xxx: Timesheet ====================
    /// Timesheet not found
    TimesheetNotFound = 4001,
    /// Timesheet already submitted for this date
    TimesheetDuplicate = 4002,
    /// Timesheet has already been approved
    TimesheetAlreadyApproved = 4003,
    /// Timesheet has already been rejected
    TimesheetAlreadyRejected = 4004,
    /// Timesheet is not awaiting approval
    TimesheetNotRequested = 4005,
    /// Hours value is not a valid HH:MM duration
    InvalidHoursFormat = 4006,
    /// Weekly timesheet not found
    WeeklyTimesheetNotFound = 4007,
    /// Weekly timesheet already exists for this week
    WeeklyTimesheetDuplicate = 4008,

    // ==================== 5xxx: Leave ====================
    /// Leave request not found
    LeaveRequestNotFound = 5001,
    /// Leave request has already been approved
    LeaveAlreadyApproved = 5002,
    /// Leave request has already been rejected
    LeaveAlreadyRejected = 5003,
    /// Leave request is not awaiting approval
    LeaveNotRequested = 5004,
    /// Leave date range is invalid
    InvalidDateRange = 5005,
    /// Leave day count is invalid
    InvalidDayCount = 5006,

    // ==================== 6xxx: Resource ====================
    /// Customer not found
    CustomerNotFound = 6001,
    /// Customer name already exists
    CustomerNameExists = 6002,
    /// Customer has associated projects
    CustomerHasProjects = 6003,
    /// Project not found
    ProjectNotFound = 6004,
    /// Project code already exists
    ProjectCodeExists = 6005,
    /// Project has active allocations
    ProjectHasAllocations = 6006,
    /// Resource allocation not found
    AllocationNotFound = 6007,
    /// Employee already allocated to this project/customer pair
    AllocationDuplicate = 6008,

    // ==================== 7xxx: Document ====================
    /// Document not found
    DocumentNotFound = 7001,
    /// File too large
    FileTooLarge = 7002,
    /// Unsupported file format
    UnsupportedFileFormat = 7003,
    /// No file provided
    NoFileProvided = 7004,
    /// Empty file provided
    EmptyFile = 7005,
    /// No filename provided
    NoFilename = 7006,
    /// File storage failed
    FileStorageFailed = 7007,
    /// Document has already been reviewed
    DocumentAlreadyReviewed = 7008,

    // ==================== 8xxx: Notification ====================
    /// Mail transport is not configured
    MailNotConfigured = 8001,
    /// Mail delivery failed
    MailSendFailed = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Field encryption failed
    EncryptionFailed = 9006,
    /// Field decryption failed
    DecryptionFailed = 9007,
    /// Database backup failed
    BackupFailed = 9008,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::RefreshTokenInvalid => "Refresh token is missing or invalid",
            ErrorCode::ResetTokenInvalid => "Password reset token is invalid",
            ErrorCode::ResetTokenExpired => "Password reset token has expired",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::NotRecordOwner => "Caller does not own this record",
            ErrorCode::CannotModifySuperUser => "Cannot modify the super user account",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeeCodeExists => "Employee code already exists",
            ErrorCode::EmployeeEmailExists => "Employee email already exists",
            ErrorCode::EmployeeInactive => "Employee is inactive",
            ErrorCode::EmployeeHasAllocations => "Employee has active resource allocations",
            ErrorCode::UserNotFound => "User account not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::ManagerNotFound => "Referenced manager or director not found",

            // Timesheet
            ErrorCode::TimesheetNotFound => "Timesheet not found",
            ErrorCode::TimesheetDuplicate => "Timesheet already submitted for this date",
            ErrorCode::TimesheetAlreadyApproved => "Timesheet has already been approved",
            ErrorCode::TimesheetAlreadyRejected => "Timesheet has already been rejected",
            ErrorCode::TimesheetNotRequested => "Timesheet is not awaiting approval",
            ErrorCode::InvalidHoursFormat => "Hours must be an HH:MM duration",
            ErrorCode::WeeklyTimesheetNotFound => "Weekly timesheet not found",
            ErrorCode::WeeklyTimesheetDuplicate => "Weekly timesheet already exists for this week",

            // Leave
            ErrorCode::LeaveRequestNotFound => "Leave request not found",
            ErrorCode::LeaveAlreadyApproved => "Leave request has already been approved",
            ErrorCode::LeaveAlreadyRejected => "Leave request has already been rejected",
            ErrorCode::LeaveNotRequested => "Leave request is not awaiting approval",
            ErrorCode::InvalidDateRange => "End date must not be before start date",
            ErrorCode::InvalidDayCount => "Day count does not match the date range",

            // Resource
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerNameExists => "Customer name already exists",
            ErrorCode::CustomerHasProjects => "Customer has associated projects",
            ErrorCode::ProjectNotFound => "Project not found",
            ErrorCode::ProjectCodeExists => "Project code already exists",
            ErrorCode::ProjectHasAllocations => "Project has active allocations",
            ErrorCode::AllocationNotFound => "Resource allocation not found",
            ErrorCode::AllocationDuplicate => {
                "Employee is already allocated to this project and customer"
            }

            // Document
            ErrorCode::DocumentNotFound => "Document not found",
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::FileStorageFailed => "File storage failed",
            ErrorCode::DocumentAlreadyReviewed => "Document has already been reviewed",

            // Notification
            ErrorCode::MailNotConfigured => "Mail transport is not configured",
            ErrorCode::MailSendFailed => "Mail delivery failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::EncryptionFailed => "Field encryption failed",
            ErrorCode::DecryptionFailed => "Field decryption failed",
            ErrorCode::BackupFailed => "Database backup failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            4 => Ok(Self::AlreadyExists),
            5 => Ok(Self::InvalidRequest),
            6 => Ok(Self::InvalidFormat),
            7 => Ok(Self::RequiredField),
            8 => Ok(Self::ValueOutOfRange),

            1001 => Ok(Self::NotAuthenticated),
            1002 => Ok(Self::InvalidCredentials),
            1003 => Ok(Self::TokenExpired),
            1004 => Ok(Self::TokenInvalid),
            1005 => Ok(Self::SessionExpired),
            1006 => Ok(Self::AccountDisabled),
            1007 => Ok(Self::RefreshTokenInvalid),
            1008 => Ok(Self::ResetTokenInvalid),
            1009 => Ok(Self::ResetTokenExpired),
            1010 => Ok(Self::PasswordTooShort),

            2001 => Ok(Self::PermissionDenied),
            2002 => Ok(Self::RoleRequired),
            2003 => Ok(Self::AdminRequired),
            2004 => Ok(Self::NotRecordOwner),
            2005 => Ok(Self::CannotModifySuperUser),

            3001 => Ok(Self::EmployeeNotFound),
            3002 => Ok(Self::EmployeeCodeExists),
            3003 => Ok(Self::EmployeeEmailExists),
            3004 => Ok(Self::EmployeeInactive),
            3005 => Ok(Self::EmployeeHasAllocations),
            3006 => Ok(Self::UserNotFound),
            3007 => Ok(Self::UsernameExists),
            3008 => Ok(Self::ManagerNotFound),

            4001 => Ok(Self::TimesheetNotFound),
            4002 => Ok(Self::TimesheetDuplicate),
            4003 => Ok(Self::TimesheetAlreadyApproved),
            4004 => Ok(Self::TimesheetAlreadyRejected),
            4005 => Ok(Self::TimesheetNotRequested),
            4006 => Ok(Self::InvalidHoursFormat),
            4007 => Ok(Self::WeeklyTimesheetNotFound),
            4008 => Ok(Self::WeeklyTimesheetDuplicate),

            5001 => Ok(Self::LeaveRequestNotFound),
            5002 => Ok(Self::LeaveAlreadyApproved),
            5003 => Ok(Self::LeaveAlreadyRejected),
            5004 => Ok(Self::LeaveNotRequested),
            5005 => Ok(Self::InvalidDateRange),
            5006 => Ok(Self::InvalidDayCount),

            6001 => Ok(Self::CustomerNotFound),
            6002 => Ok(Self::CustomerNameExists),
            6003 => Ok(Self::CustomerHasProjects),
            6004 => Ok(Self::ProjectNotFound),
            6005 => Ok(Self::ProjectCodeExists),
            6006 => Ok(Self::ProjectHasAllocations),
            6007 => Ok(Self::AllocationNotFound),
            6008 => Ok(Self::AllocationDuplicate),

            7001 => Ok(Self::DocumentNotFound),
            7002 => Ok(Self::FileTooLarge),
            7003 => Ok(Self::UnsupportedFileFormat),
            7004 => Ok(Self::NoFileProvided),
            7005 => Ok(Self::EmptyFile),
            7006 => Ok(Self::NoFilename),
            7007 => Ok(Self::FileStorageFailed),
            7008 => Ok(Self::DocumentAlreadyReviewed),

            8001 => Ok(Self::MailNotConfigured),
            8002 => Ok(Self::MailSendFailed),

            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::DatabaseError),
            9003 => Ok(Self::NetworkError),
            9004 => Ok(Self::TimeoutError),
            9005 => Ok(Self::ConfigError),
            9006 => Ok(Self::EncryptionFailed),
            9007 => Ok(Self::DecryptionFailed),
            9008 => Ok(Self::BackupFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
