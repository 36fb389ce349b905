//! Envelope encryption with AES-256-GCM
//!
//! Master key comes from the `HRMS_MASTER_KEY` environment variable
//! (base64, 32 bytes). Employee PII columns are encrypted with this key.
//!
//! Format: base64(nonce_12bytes || ciphertext || tag_16bytes)

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use thiserror::Error;
use zeroize::Zeroize;

use shared::error::{AppError, AppResult};
use shared::models::{Employee, EmployeeCreate};

use crate::db::repository::employee::EncryptedPii;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// 加密错误
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("加密失败")]
    EncryptFailed,

    #[error("解密失败 (密钥错误或数据被篡改)")]
    DecryptFailed,

    #[error("无效的密文格式: {0}")]
    InvalidFormat(String),
}

/// Master encryption key (32 bytes for AES-256-GCM)
#[derive(Clone)]
pub struct MasterKey {
    key: [u8; KEY_LEN],
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

impl MasterKey {
    /// 从环境变量 `HRMS_MASTER_KEY` 加载主密钥
    pub fn from_env() -> Result<Self, CryptoError> {
        let b64 = std::env::var("HRMS_MASTER_KEY").map_err(|_| {
            CryptoError::Config("HRMS_MASTER_KEY environment variable not set".to_string())
        })?;
        Self::from_base64(b64.trim())
    }

    /// 从 base64 字符串解析主密钥
    pub fn from_base64(b64: &str) -> Result<Self, CryptoError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .map_err(|_| CryptoError::Config("HRMS_MASTER_KEY is not valid base64".to_string()))?;
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::Config(format!(
                "Master key wrong length: {} (expected {KEY_LEN})",
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// 生成随机主密钥 (用于开发环境和测试)
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut key);
        Self { key }
    }

    /// Encrypt plaintext → base64(nonce || ciphertext || tag)
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| CryptoError::EncryptFailed)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::EncryptFailed)?;

        // nonce || ciphertext (includes tag)
        let mut result = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(&result))
    }

    /// Decrypt base64(nonce || ciphertext || tag) → plaintext
    pub fn decrypt(&self, encrypted_b64: &str) -> Result<Vec<u8>, CryptoError> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(encrypted_b64)
            .map_err(|_| CryptoError::InvalidFormat("Invalid base64".to_string()))?;

        if data.len() < NONCE_LEN + 16 {
            return Err(CryptoError::InvalidFormat(
                "Ciphertext too short".to_string(),
            ));
        }

        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| CryptoError::DecryptFailed)?;
        let nonce = Nonce::from_slice(&data[..NONCE_LEN]);
        let ciphertext = &data[NONCE_LEN..];

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptFailed)
    }

    /// Encrypt a string → base64 blob
    pub fn encrypt_string(&self, plaintext: &str) -> Result<String, CryptoError> {
        self.encrypt(plaintext.as_bytes())
    }

    /// Decrypt base64 blob → string
    pub fn decrypt_string(&self, encrypted_b64: &str) -> Result<String, CryptoError> {
        let bytes = self.decrypt(encrypted_b64)?;
        String::from_utf8(bytes)
            .map_err(|_| CryptoError::InvalidFormat("Decrypted data is not valid UTF-8".into()))
    }
}

/// PII 加解密服务
///
/// 封装主密钥，提供员工 PII 字段的批量加解密。
#[derive(Debug, Clone)]
pub struct CryptoService {
    master: MasterKey,
}

impl CryptoService {
    /// 从环境加载主密钥创建服务
    ///
    /// 开发环境缺少 `HRMS_MASTER_KEY` 时使用临时密钥 (重启后历史密文不可解)，
    /// 生产环境直接终止进程。
    pub fn new() -> Self {
        let master = match MasterKey::from_env() {
            Ok(key) => key,
            Err(e) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("Master key configuration error: {}, using temporary key", e);
                    MasterKey::generate()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("FATAL: HRMS_MASTER_KEY configuration failed: {}", e);
                }
            }
        };
        Self { master }
    }

    /// 使用指定密钥创建服务 (测试用)
    pub fn with_key(master: MasterKey) -> Self {
        Self { master }
    }

    /// 加密单个 PII 字段
    pub fn encrypt_field(&self, plaintext: &str) -> AppResult<String> {
        self.master
            .encrypt_string(plaintext)
            .map_err(|e| AppError::internal(format!("PII encryption failed: {}", e)))
    }

    /// 解密单个 PII 字段
    pub fn decrypt_field(&self, blob: &str) -> AppResult<String> {
        self.master
            .decrypt_string(blob)
            .map_err(|e| AppError::internal(format!("PII decryption failed: {}", e)))
    }

    fn encrypt_opt(&self, value: &Option<String>) -> AppResult<Option<String>> {
        match value.as_deref() {
            Some(v) if !v.is_empty() => Ok(Some(self.encrypt_field(v)?)),
            _ => Ok(None),
        }
    }

    /// 加密创建请求中的全部 PII 字段
    pub fn encrypt_employee_pii(&self, data: &EmployeeCreate) -> AppResult<EncryptedPii> {
        Ok(EncryptedPii {
            pan_enc: self.encrypt_opt(&data.pan)?,
            aadhaar_enc: self.encrypt_opt(&data.aadhaar)?,
            bank_account_enc: self.encrypt_opt(&data.bank_account)?,
            pf_number_enc: self.encrypt_opt(&data.pf_number)?,
        })
    }

    /// 解密员工记录中的 PII 信封，填充明文字段
    pub fn decrypt_employee(&self, employee: &mut Employee) -> AppResult<()> {
        if let Some(blob) = employee.pan_enc.as_deref() {
            employee.pan = Some(self.decrypt_field(blob)?);
        }
        if let Some(blob) = employee.aadhaar_enc.as_deref() {
            employee.aadhaar = Some(self.decrypt_field(blob)?);
        }
        if let Some(blob) = employee.bank_account_enc.as_deref() {
            employee.bank_account = Some(self.decrypt_field(blob)?);
        }
        if let Some(blob) = employee.pf_number_enc.as_deref() {
            employee.pf_number = Some(self.decrypt_field(blob)?);
        }
        Ok(())
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let key = MasterKey::generate();
        let blob = key.encrypt_string("ABCDE1234F").expect("encrypt");
        assert_ne!(blob, "ABCDE1234F");
        assert_eq!(key.decrypt_string(&blob).expect("decrypt"), "ABCDE1234F");
    }

    #[test]
    fn test_unique_nonce_per_encryption() {
        let key = MasterKey::generate();
        let a = key.encrypt_string("same input").expect("encrypt");
        let b = key.encrypt_string("same input").expect("encrypt");
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails() {
        let blob = MasterKey::generate()
            .encrypt_string("secret")
            .expect("encrypt");
        let other = MasterKey::generate();
        assert!(matches!(
            other.decrypt_string(&blob),
            Err(CryptoError::DecryptFailed)
        ));
    }

    #[test]
    fn test_tampered_data_fails() {
        let key = MasterKey::generate();
        let blob = key.encrypt_string("secret").expect("encrypt");
        let mut raw = base64::engine::general_purpose::STANDARD
            .decode(&blob)
            .expect("decode");
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        let tampered = base64::engine::general_purpose::STANDARD.encode(&raw);
        assert!(key.decrypt_string(&tampered).is_err());
    }

    #[test]
    fn test_malformed_input_rejected() {
        let key = MasterKey::generate();
        assert!(matches!(
            key.decrypt_string("not base64!!!"),
            Err(CryptoError::InvalidFormat(_))
        ));
        assert!(matches!(
            key.decrypt_string("c2hvcnQ="),
            Err(CryptoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_key_length_enforced() {
        let short = base64::engine::general_purpose::STANDARD.encode([0u8; 16]);
        assert!(matches!(
            MasterKey::from_base64(&short),
            Err(CryptoError::Config(_))
        ));
    }

    #[test]
    fn test_employee_pii_encrypt_decrypt() {
        let service = CryptoService::with_key(MasterKey::generate());
        let data = EmployeeCreate {
            employee_code: "EMP001".into(),
            first_name: "Asha".into(),
            last_name: "Nair".into(),
            email: "asha@example.com".into(),
            phone: None,
            designation: None,
            department: None,
            manager_id: None,
            director_id: None,
            date_of_joining: "2024-01-15".into(),
            pan: Some("ABCDE1234F".into()),
            aadhaar: Some("123456789012".into()),
            bank_account: None,
            pf_number: Some("PF/123/456".into()),
        };

        let pii = service.encrypt_employee_pii(&data).expect("encrypt");
        assert!(pii.pan_enc.is_some());
        assert!(pii.bank_account_enc.is_none());
        assert_eq!(
            service
                .decrypt_field(pii.pan_enc.as_deref().expect("pan"))
                .expect("decrypt"),
            "ABCDE1234F"
        );
    }
}
