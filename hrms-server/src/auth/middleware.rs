//! 认证与授权中间件
//!
//! `require_auth` 挂在整个应用上，负责把 JWT 换成 [`CurrentUser`]；
//! `require_role` / `require_permission` 挂在具体路由组上做粗粒度拦截，
//! 行级规则 (只能看自己的记录等) 仍在 handler 内判断。

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 免认证的 API 路径；其余 `/api/` 请求一律要求 Bearer 令牌
const PUBLIC_API_ROUTES: &[&str] = &[
    "/api/health",
    "/api/auth/login",
    "/api/auth/refresh",
    "/api/auth/forgot-password",
    "/api/auth/reset-password",
];

fn skips_auth(req: &Request) -> bool {
    // CORS 预检不带 Authorization 头
    if req.method() == http::Method::OPTIONS {
        return true;
    }
    let path = req.uri().path();
    // 非 API 路径交给路由器正常 404
    !path.starts_with("/api/") || PUBLIC_API_ROUTES.contains(&path)
}

/// 认证中间件
///
/// 从 `Authorization: Bearer <token>` 验证 JWT，成功后把 [`CurrentUser`]
/// 塞进请求扩展。缺头 401，过期 401 TokenExpired，其余验证失败 401 TokenInvalid。
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if skips_auth(&req) {
        return Ok(next.run(req).await);
    }

    let Some(header) = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
        return Err(AppError::unauthorized());
    };

    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claims = state.get_jwt_service().validate_token(token).map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = format!("{}", e),
            uri = format!("{:?}", req.uri())
        );
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let user = CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

type GateFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

async fn gate(
    req: Request,
    next: Next,
    check: impl FnOnce(&CurrentUser) -> Result<(), AppError>,
) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    check(user)?;
    Ok(next.run(req).await)
}

/// 角色拦截：当前用户必须属于 `roles` 之一，否则 403
///
/// ```ignore
/// Router::new()
///     .route("/{id}/approve", post(handler::approve))
///     .route_layer(middleware::from_fn(require_role(APPROVER_ROLES)));
/// ```
pub fn require_role(
    roles: &'static [&'static str],
) -> impl Fn(Request, Next) -> GateFuture + Clone {
    move |req, next| {
        Box::pin(gate(req, next, move |user| {
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
        }))
    }
}

/// 权限拦截：当前用户必须持有 `permission` (支持 `module:*` 通配)，否则 403
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(Request, Next) -> GateFuture + Clone {
    move |req, next| {
        Box::pin(gate(req, next, move |user| {
            if user.has_permission(permission) {
                return Ok(());
            }
            security_log!(
                "WARN",
                "permission_denied",
                user_id = user.id,
                username = user.username.clone(),
                required_permission = permission
            );
            Err(AppError::forbidden(format!(
                "Permission denied: {}",
                permission
            )))
        }))
    }
}

/// 从请求扩展里取 [`CurrentUser`] 的便捷方法
pub trait CurrentUserExt {
    /// 未认证 (中间件未注入) 时返回 401
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or(AppError::unauthorized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> Request {
        Request::builder()
            .method(http::Method::GET)
            .uri(uri)
            .body(axum::body::Body::empty())
            .expect("request")
    }

    #[test]
    fn test_public_routes_skip_auth() {
        assert!(skips_auth(&get("/api/health")));
        assert!(skips_auth(&get("/api/auth/login")));
        assert!(skips_auth(&get("/favicon.ico")));
        assert!(!skips_auth(&get("/api/employees")));
        assert!(!skips_auth(&get("/api/auth/logout")));
    }

    #[test]
    fn test_options_skips_auth() {
        let req = Request::builder()
            .method(http::Method::OPTIONS)
            .uri("/api/employees")
            .body(axum::body::Body::empty())
            .expect("request");
        assert!(skips_auth(&req));
    }
}
