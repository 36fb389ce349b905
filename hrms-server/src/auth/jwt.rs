//! JWT 令牌服务
//!
//! 签发和验证访问令牌；[`CurrentUser`] 是 Claims 在请求生命周期内的解析形态。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::permissions;

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_EXPIRATION_MINUTES: i64 = 60;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// 签名密钥，不少于 [`MIN_SECRET_LEN`] 字节
    pub secret: String,
    /// 访问令牌有效期 (分钟)
    pub expiration_minutes: i64,
    /// iss 声明
    pub issuer: String,
    /// aud 声明
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = load_jwt_secret().unwrap_or_else(|e| {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT configuration error: {}, using temporary key", e);
                generate_secure_jwt_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("FATAL: JWT_SECRET configuration failed: {}", e);
            }
        });

        let expiration_minutes = std::env::var("JWT_EXPIRATION_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_EXPIRATION_MINUTES);

        Self {
            secret,
            expiration_minutes,
            issuer: env_or("JWT_ISSUER", "hrms-server"),
            audience: env_or("JWT_AUDIENCE", "hrms-clients"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// 令牌携带的 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户名
    pub username: String,
    /// 角色名称
    pub role: String,
    /// 权限列表 (逗号分隔)
    pub permissions: String,
    /// 令牌类型
    pub token_type: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::InvalidToken(e.to_string()),
        }
    }
}

/// 生成随机开发用密钥 (64 个字母数字字符)
pub fn generate_secure_jwt_secret() -> String {
    let rng = rand::thread_rng();
    rng.sample_iter(&Alphanumeric).take(64).map(char::from).collect()
}

fn load_jwt_secret() -> Result<String, JwtError> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| JwtError::ConfigError("JWT_SECRET environment variable not set".to_string()))?;
    if secret.len() < MIN_SECRET_LEN {
        return Err(JwtError::ConfigError(format!(
            "JWT_SECRET too short: {} bytes, need at least {}",
            secret.len(),
            MIN_SECRET_LEN
        )));
    }
    Ok(secret)
}

/// JWT 令牌服务
///
/// 密钥在构造时派生为 encoding/decoding key，之后只读。
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    pub fn with_config(config: JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            config,
        }
    }

    /// 签发访问令牌
    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        role: &str,
        permissions: &[String],
    ) -> Result<String, JwtError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            permissions: permissions.join(","),
            token_type: "access".to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证签名、过期时间和 iss/aud，返回解码后的 Claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// 从 `Authorization: Bearer <token>` 头取出令牌部分
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// 当前用户上下文
///
/// 认证中间件从 Claims 解析后注入请求扩展，handler 按需读取。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: i64,
    /// 用户名
    pub username: String,
    /// 角色名称
    pub role: String,
    /// 权限列表
    pub permissions: Vec<String>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id: i64 = claims
            .sub
            .parse()
            .map_err(|_| format!("Invalid subject claim: {}", claims.sub))?;

        let permissions = claims
            .permissions
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self {
            id,
            username: claims.username,
            role: claims.role,
            permissions,
        })
    }
}

impl CurrentUser {
    /// 是否管理员 (superUser 或 admin)
    pub fn is_admin(&self) -> bool {
        permissions::ADMIN_ROLES.contains(&self.role.as_str())
    }

    /// 是否属于指定角色集合
    pub fn has_role(&self, roles: &[&str]) -> bool {
        roles.contains(&self.role.as_str())
    }

    /// 持有指定权限则为 true
    ///
    /// 管理员和 `"all"` 授权通过一切检查；`"timesheets:*"` 这类通配
    /// 授权匹配同模块下的全部动作。
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin() {
            return true;
        }

        self.permissions.iter().any(|granted| {
            if granted == "all" || granted == permission {
                return true;
            }
            match granted.strip_suffix(":*") {
                Some(module) => permission
                    .strip_prefix(module)
                    .is_some_and(|rest| rest.starts_with(':')),
                None => false,
            }
        })
    }

    /// 持有任一指定权限则为 true
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        if self.is_admin() {
            return true;
        }
        permissions.iter().any(|p| self.has_permission(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-key-that-is-long-enough-0123".to_string(),
            expiration_minutes: 60,
            issuer: "hrms-server".to_string(),
            audience: "hrms-clients".to_string(),
        })
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = test_service();
        let permissions = vec!["timesheets:submit".to_string(), "leaves:submit".to_string()];

        let token = service
            .generate_token(123, "jdoe", "employee", &permissions)
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "123");
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role, "employee");
        assert_eq!(claims.permissions, "timesheets:submit,leaves:submit");
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let service = test_service();
        let token = service
            .generate_token(1, "jdoe", "employee", &[])
            .expect("Failed to generate test token");

        let other = JwtService::with_config(JwtConfig {
            secret: "test-secret-key-that-is-long-enough-0123".to_string(),
            expiration_minutes: 60,
            issuer: "hrms-server".to_string(),
            audience: "other-audience".to_string(),
        });
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_current_user_from_claims() {
        let service = test_service();
        let token = service
            .generate_token(42, "jdoe", "hr", &["employees:manage".to_string()])
            .expect("Failed to generate test token");
        let claims = service.validate_token(&token).expect("validate");

        let user = CurrentUser::try_from(claims).expect("convert");
        assert_eq!(user.id, 42);
        assert_eq!(user.role, "hr");
        assert!(user.has_permission("employees:manage"));
        assert!(!user.has_permission("users:manage"));
    }

    #[test]
    fn test_empty_permissions_claim_parses_to_empty_vec() {
        let service = test_service();
        let token = service
            .generate_token(7, "jdoe", "employee", &[])
            .expect("Failed to generate test token");
        let claims = service.validate_token(&token).expect("validate");

        let user = CurrentUser::try_from(claims).expect("convert");
        assert!(user.permissions.is_empty());
    }

    #[test]
    fn test_current_user_wildcard_permissions() {
        let user = CurrentUser {
            id: 1,
            username: "jdoe".to_string(),
            role: "manager".to_string(),
            permissions: vec!["timesheets:*".to_string()],
        };

        assert!(user.has_permission("timesheets:approve"));
        assert!(user.has_permission("timesheets:submit"));
        assert!(!user.has_permission("users:manage"));
        // 通配前缀必须整模块匹配
        assert!(!user.has_permission("timesheets2:approve"));
    }

    #[test]
    fn test_admin_has_all_permissions() {
        let admin = CurrentUser {
            id: 1,
            username: "root".to_string(),
            role: "superUser".to_string(),
            permissions: vec![],
        };

        assert!(admin.has_permission("employees:manage"));
        assert!(admin.has_permission("users:manage"));
        assert!(admin.is_admin());
    }

    #[test]
    fn test_malformed_subject_rejected() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            username: "x".to_string(),
            role: "employee".to_string(),
            permissions: String::new(),
            token_type: "access".to_string(),
            exp: 0,
            iat: 0,
            iss: "hrms-server".to_string(),
            aud: "hrms-clients".to_string(),
        };
        assert!(CurrentUser::try_from(claims).is_err());
    }
}
