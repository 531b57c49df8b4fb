mod hmac_sha256;
mod payload;
mod secret;
mod signer;

pub use hmac_sha256::HmacSha256Signer;
pub use payload::{SignedPayload, SigningRequest, VerificationRequest};
pub(crate) use payload::required;
pub use secret::{SecretKey, SECRET_ENV_VAR};
pub use signer::PayloadSigner;
