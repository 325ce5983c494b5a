//! Security module - Key handling, at-rest encryption, and log sanitization
//!
//! - `SecureString` keeps decrypted API keys out of logs and zeroes them on drop
//! - `KeyCipher` seals user keys with `ENCRYPTION_KEY` before they are stored
//! - `Sanitizer` renders keys and URLs safely for tracing output

mod cipher;
mod sanitizer;
mod secure_string;

pub use cipher::{CipherError, KeyCipher, ENCRYPTION_KEY_VAR};
pub use sanitizer::Sanitizer;
pub use secure_string::SecureString;
