//! At-rest encryption for user-supplied API keys
//!
//! Keys are sealed with AES-256-GCM under a key derived from `ENCRYPTION_KEY`.
//! Stored layout: base64(nonce (12 bytes) + ciphertext + tag (16 bytes)).

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::Engine;
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

use super::SecureString;

/// Environment variable holding the key-encryption secret
pub const ENCRYPTION_KEY_VAR: &str = "ENCRYPTION_KEY";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Errors that can occur while sealing or opening stored keys
#[derive(Debug, Error)]
pub enum CipherError {
    /// `ENCRYPTION_KEY` is not set or blank
    #[error("Encryption key not configured (ENCRYPTION_KEY)")]
    MissingKey,

    /// Stored value is not valid base64 or is too short
    #[error("Malformed ciphertext: {0}")]
    Malformed(String),

    /// AES-GCM rejected the operation (wrong key or tampered data)
    #[error("AES-GCM operation failed")]
    Aead,

    /// Decrypted bytes are not UTF-8
    #[error("Decrypted key is not valid UTF-8")]
    Utf8,
}

/// Seals and opens API keys for storage
#[derive(Clone)]
pub struct KeyCipher {
    cipher: Aes256Gcm,
}

impl KeyCipher {
    /// Derives the AES key from an arbitrary secret string
    pub fn new(secret: &str) -> Result<Self, CipherError> {
        if secret.trim().is_empty() {
            return Err(CipherError::MissingKey);
        }

        let key: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(secret.as_bytes()).into());
        let cipher = Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CipherError::Aead)?;
        Ok(Self { cipher })
    }

    /// Builds a cipher from `ENCRYPTION_KEY`
    pub fn from_env() -> Result<Self, CipherError> {
        let secret = Zeroizing::new(
            std::env::var(ENCRYPTION_KEY_VAR).map_err(|_| CipherError::MissingKey)?,
        );
        Self::new(&secret)
    }

    /// Encrypts a plaintext key into its stored form
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Aead)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&sealed);
        Ok(base64::engine::general_purpose::STANDARD.encode(out))
    }

    /// Decrypts a stored key back into plaintext
    pub fn decrypt(&self, stored: &str) -> Result<SecureString, CipherError> {
        let raw = base64::engine::general_purpose::STANDARD
            .decode(stored.trim())
            .map_err(|e| CipherError::Malformed(e.to_string()))?;

        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Malformed("ciphertext too short".into()));
        }

        let (nonce_bytes, sealed) = raw.split_at(NONCE_LEN);
        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(Nonce::from_slice(nonce_bytes), sealed)
                .map_err(|_| CipherError::Aead)?,
        );

        let text = std::str::from_utf8(&plaintext).map_err(|_| CipherError::Utf8)?;
        Ok(SecureString::from(text))
    }
}

impl std::fmt::Debug for KeyCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyCipher([REDACTED])")
    }
}
