//! Permission Definitions
//!
//! Simplified RBAC permission system.
//!
//! ## 设计原则
//! - 员工基础操作（提交工时、查看自己的记录）登录即可使用
//! - 模块化权限：按功能模块授权
//! - 审批操作：单独控制
//! - 用户管理：仅 superUser/admin 角色可用

/// 角色名称常量
pub const SUPER_USER: &str = "superUser";
pub const ADMIN: &str = "admin";
pub const HR: &str = "hr";
pub const MANAGER: &str = "manager";
pub const EMPLOYEE: &str = "employee";
pub const CUSTOMER: &str = "customer";

/// 管理员角色集合（拥有全部权限）
pub const ADMIN_ROLES: &[&str] = &[SUPER_USER, ADMIN];

/// 人事角色集合（可管理员工档案和用户账号）
pub const HR_ROLES: &[&str] = &[SUPER_USER, ADMIN, HR];

/// 审批角色集合（可审批工时和请假）
pub const APPROVER_ROLES: &[&str] = &[SUPER_USER, ADMIN, HR, MANAGER];

/// 可配置权限列表
/// 不包含 "all" 和 "users:manage"，这些是系统级权限
pub const ALL_PERMISSIONS: &[&str] = &[
    // === 模块化权限 ===
    "employees:read",    // 查看员工档案
    "employees:manage",  // 员工档案管理（含加密 PII）
    "resources:read",    // 查看客户/项目/资源分配
    "resources:manage",  // 客户/项目/资源分配管理
    // === 提交操作 ===
    "timesheets:submit", // 提交/修改自己的工时
    "leaves:submit",     // 提交请假申请
    "documents:upload",  // 上传证件文档
    // === 审批操作 ===
    "timesheets:approve", // 审批工时
    "leaves:approve",     // 审批请假
    "documents:review",   // 审核证件文档
];

/// Admin 专属权限（不在可配置列表中）
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &[
    "users:manage", // 用户管理
    "all",          // 超级权限
];

/// Default role permissions
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 人事角色默认权限
pub const DEFAULT_HR_PERMISSIONS: &[&str] = &[
    "employees:read",
    "employees:manage",
    "resources:read",
    "resources:manage",
    "timesheets:submit",
    "leaves:submit",
    "documents:upload",
    "timesheets:approve",
    "leaves:approve",
    "documents:review",
];

/// 经理角色默认权限（审批 + 本人提交）
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = &[
    "employees:read",
    "resources:read",
    "timesheets:submit",
    "leaves:submit",
    "documents:upload",
    "timesheets:approve",
    "leaves:approve",
];

/// 普通员工默认权限（仅本人提交）
pub const DEFAULT_EMPLOYEE_PERMISSIONS: &[&str] = &[
    "timesheets:submit",
    "leaves:submit",
    "documents:upload",
];

/// 客户联系人默认权限（仅查看资源分配）
pub const DEFAULT_CUSTOMER_PERMISSIONS: &[&str] = &["resources:read"];

/// Get permissions for a role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    let set: &[&str] = match role_name {
        SUPER_USER | ADMIN => DEFAULT_ADMIN_PERMISSIONS,
        HR => DEFAULT_HR_PERMISSIONS,
        MANAGER => DEFAULT_MANAGER_PERMISSIONS,
        EMPLOYEE => DEFAULT_EMPLOYEE_PERMISSIONS,
        CUSTOMER => DEFAULT_CUSTOMER_PERMISSIONS,
        _ => &[],
    };
    set.iter().map(|s| s.to_string()).collect()
}

/// Validate if a permission string is valid
pub fn is_valid_permission(permission: &str) -> bool {
    ALL_PERMISSIONS.contains(&permission)
        || ADMIN_ONLY_PERMISSIONS.contains(&permission)
        || permission.ends_with(":*")
}

/// Validate if a role name is one of the known roles
pub fn is_valid_role(role: &str) -> bool {
    matches!(role, SUPER_USER | ADMIN | HR | MANAGER | EMPLOYEE | CUSTOMER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permissions_per_role() {
        assert_eq!(get_default_permissions("admin"), vec!["all"]);
        assert_eq!(get_default_permissions("superUser"), vec!["all"]);
        assert!(
            get_default_permissions("hr").contains(&"employees:manage".to_string())
        );
        assert!(
            get_default_permissions("manager").contains(&"timesheets:approve".to_string())
        );
        assert!(
            !get_default_permissions("employee").contains(&"timesheets:approve".to_string())
        );
        assert!(get_default_permissions("unknown").is_empty());
    }

    #[test]
    fn test_is_valid_permission() {
        assert!(is_valid_permission("timesheets:submit"));
        assert!(is_valid_permission("users:manage"));
        assert!(is_valid_permission("all"));
        assert!(is_valid_permission("timesheets:*"));
        assert!(!is_valid_permission("timesheets:delete_all"));
    }

    #[test]
    fn test_role_sets() {
        assert!(ADMIN_ROLES.contains(&"superUser"));
        assert!(!ADMIN_ROLES.contains(&"hr"));
        assert!(HR_ROLES.contains(&"hr"));
        assert!(APPROVER_ROLES.contains(&"manager"));
        assert!(!APPROVER_ROLES.contains(&"employee"));
        assert!(is_valid_role("customer"));
        assert!(!is_valid_role("root"));
    }
}
