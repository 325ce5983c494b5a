//! API key holder with automatic memory zeroization
//!
//! Keys enter `AIConfig` as plaintext after decryption; this wrapper keeps
//! them out of `Debug` output and wipes them when the config is dropped.

use std::fmt;
use std::ops::Deref;
use zeroize::Zeroize;

/// A string that clears its memory when dropped
///
/// # Example
///
/// ```
/// use ai_gateway::security::SecureString;
///
/// let key = SecureString::new("sk-live-123".to_string());
/// assert_eq!(key.as_str(), "sk-live-123");
/// assert!(!format!("{:?}", key).contains("sk-live"));
/// ```
#[derive(Clone, Default)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    pub fn new(s: String) -> Self {
        Self { inner: s }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns true if the key is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }

    /// Formats a bearer authorization header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.inner)
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Zeroize for SecureString {
    fn zeroize(&mut self) {
        self.inner.zeroize();
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<str> for SecureString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.inner.len())
            .field("content", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
    }
}

impl Eq for SecureString {}

impl PartialEq<str> for SecureString {
    fn eq(&self, other: &str) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.as_bytes())
    }
}

impl PartialEq<&str> for SecureString {
    fn eq(&self, other: &&str) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacted() {
        let key = SecureString::from("sk-ant-api03-secret");
        let debug_output = format!("{:?}", key);
        assert!(!debug_output.contains("secret"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_bearer_header() {
        let key = SecureString::from("sk-test");
        assert_eq!(key.bearer(), "Bearer sk-test");
    }

    #[test]
    fn test_blank_detection() {
        assert!(SecureString::from("   ").is_blank());
        assert!(SecureString::default().is_blank());
        assert!(!SecureString::from("k").is_blank());
    }

    #[test]
    fn test_equality() {
        let key = SecureString::from("same");
        assert_eq!(key, SecureString::from("same"));
        assert!(key == "same");
        assert!(key != "other");
        assert!(!constant_time_eq(b"short", b"longer"));
    }

    #[test]
    fn test_zeroize_clears() {
        let mut key = SecureString::from("secret");
        key.zeroize();
        assert!(key.is_empty());
    }
}
