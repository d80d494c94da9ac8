// src/utils/crypto.rs

use crate::utils::{DashboardError, DashboardResult};
use aes_gcm::aead::Aead;
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};
use base64::{engine::general_purpose, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// AES-256-GCM cipher for integration credential blobs. The CRUD side writes
/// blobs with the same scheme; both ends derive the key from the shared
/// `CREDENTIALS_ENCRYPTION_KEY` secret.
pub struct CredentialCipher {
    encryption_key: SecretString,
}

impl CredentialCipher {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            encryption_key: SecretString::new(key.into()),
        }
    }

    fn derive_key(&self) -> Key<Aes256Gcm> {
        let mut hasher = Sha256::new();
        hasher.update(self.encryption_key.expose_secret().as_bytes());
        let key_bytes = hasher.finalize();
        *Key::<Aes256Gcm>::from_slice(&key_bytes)
    }

    /// Encrypt and encode as base64(nonce || ciphertext).
    pub fn encrypt(&self, plaintext: &str) -> DashboardResult<String> {
        use rand::rngs::OsRng;

        let cipher = Aes256Gcm::new(&self.derive_key());
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| DashboardError::parse_error(format!("Encryption failed: {}", e)))?;

        let mut encrypted_data = nonce.to_vec();
        encrypted_data.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(encrypted_data))
    }

    pub fn decrypt(&self, encrypted: &str) -> DashboardResult<String> {
        let encrypted_data = general_purpose::STANDARD.decode(encrypted).map_err(|e| {
            DashboardError::parse_error(format!("Failed to decode encrypted blob: {}", e))
        })?;

        // Nonce is 12 bytes; anything shorter cannot hold a payload
        if encrypted_data.len() < 12 {
            return Err(DashboardError::parse_error(
                "Invalid encrypted data length".to_string(),
            ));
        }

        let cipher = Aes256Gcm::new(&self.derive_key());
        let (nonce_bytes, ciphertext) = encrypted_data.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| DashboardError::parse_error(format!("Decryption failed: {}", e)))?;

        String::from_utf8(plaintext).map_err(|e| {
            DashboardError::parse_error(format!("Decrypted data is not valid UTF-8: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let cipher = CredentialCipher::new("test-master-key");
        let blob = cipher.encrypt(r#"{"access_token":"abc123"}"#).unwrap();
        let plain = cipher.decrypt(&blob).unwrap();
        assert_eq!(plain, r#"{"access_token":"abc123"}"#);
    }

    #[test]
    fn test_decrypt_rejects_wrong_key() {
        let blob = CredentialCipher::new("key-a").encrypt("secret").unwrap();
        assert!(CredentialCipher::new("key-b").decrypt(&blob).is_err());
    }

    #[test]
    fn test_decrypt_rejects_truncated_blob() {
        let cipher = CredentialCipher::new("test-master-key");
        assert!(cipher.decrypt("AAAA").is_err());
        assert!(cipher.decrypt("not base64!!").is_err());
    }
}
