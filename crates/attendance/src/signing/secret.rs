use std::fmt;

use crate::error::AttendanceError;

/// Environment variable the server reads the HMAC secret from.
pub const SECRET_ENV_VAR: &str = "QR_SIGNING_SECRET";

/// Shared HMAC secret. Loaded once at startup and read-only afterwards.
///
/// `Debug` is redacted so the key never ends up in logs.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(secret: impl Into<String>) -> Result<Self, AttendanceError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AttendanceError::Configuration(
                "signing secret is empty".to_string(),
            ));
        }
        Ok(Self(secret.into_bytes()))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}
