//! # 凭证密封模块
//!
//! 处理密封存储的凭证值的加密和解密（AES-256-GCM信封）

use aes_gcm::{
    Aes256Gcm,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// 密封的凭证值信封
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedValue {
    /// Base64编码的密文
    pub data: String,
    /// Base64编码的随机数
    pub nonce: String,
}

/// 凭证密封器
pub struct SecretCrypto {
    cipher: Aes256Gcm,
}

impl SecretCrypto {
    /// 创建新的凭证密封器
    #[must_use]
    pub fn new(key: &[u8; 32]) -> Self {
        let key: [u8; 32] = *key;
        let key = key.into();
        let cipher = Aes256Gcm::new(&key);
        Self { cipher }
    }

    /// 从十六进制字符串创建密封器
    pub fn from_hex(key_str: &str) -> crate::error::Result<Self> {
        if key_str.len() != 64 {
            return Err(crate::error::GatewayError::crypto(
                "解封密钥必须是64个字符的十六进制字符串（32字节）",
            ));
        }

        let key_bytes = hex::decode(key_str)
            .map_err(|e| crate::error::GatewayError::crypto_with_source("解封密钥格式错误", e))?;

        let mut key = [0u8; 32];
        key.copy_from_slice(&key_bytes);
        Ok(Self::new(&key))
    }

    /// 密封明文凭证
    pub fn seal(&self, plaintext: &str) -> crate::error::Result<SealedValue> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| {
                crate::error::GatewayError::crypto_with_source(
                    "凭证密封失败",
                    anyhow::anyhow!("AES-GCM encryption failed: {e}"),
                )
            })?;

        Ok(SealedValue {
            data: general_purpose::STANDARD.encode(&ciphertext),
            nonce: general_purpose::STANDARD.encode(nonce),
        })
    }

    /// 解封凭证信封
    pub fn open(&self, sealed: &SealedValue) -> crate::error::Result<String> {
        let ciphertext = general_purpose::STANDARD
            .decode(&sealed.data)
            .map_err(|e| crate::error::GatewayError::crypto_with_source("密文格式错误", e))?;

        let nonce_bytes = general_purpose::STANDARD
            .decode(&sealed.nonce)
            .map_err(|e| crate::error::GatewayError::crypto_with_source("随机数格式错误", e))?;

        let nonce_bytes: [u8; 12] = nonce_bytes
            .try_into()
            .map_err(|_| crate::error::GatewayError::crypto("随机数长度错误"))?;
        let nonce = nonce_bytes.into();

        let plaintext = self
            .cipher
            .decrypt(&nonce, ciphertext.as_ref())
            .map_err(|e| {
                crate::error::GatewayError::crypto_with_source(
                    "凭证解封失败",
                    anyhow::anyhow!("AES-GCM decryption failed: {e}"),
                )
            })?;

        String::from_utf8(plaintext).map_err(|e| {
            crate::error::GatewayError::crypto_with_source("解封后的数据不是有效的UTF-8字符串", e)
        })
    }

    /// 生成新的解封密钥
    #[must_use]
    pub fn generate_key() -> String {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        hex::encode(key)
    }
}
