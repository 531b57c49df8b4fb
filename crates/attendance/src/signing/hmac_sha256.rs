use anyhow::{Result, anyhow};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::secret::SecretKey;
use super::signer::PayloadSigner;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 over the canonical message with the shared secret.
pub struct HmacSha256Signer {
    secret: SecretKey,
}

impl HmacSha256Signer {
    pub fn new(secret: SecretKey) -> Self {
        Self { secret }
    }

    fn mac(&self, message: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| anyhow!("invalid HMAC key: {e}"))?;
        mac.update(message);
        Ok(mac)
    }
}

impl PayloadSigner for HmacSha256Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.mac(message)?.finalize().into_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool> {
        Ok(self.mac(message)?.verify_slice(signature).is_ok())
    }

    fn algorithm(&self) -> &str {
        "hmac-sha256"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(secret: &str) -> HmacSha256Signer {
        HmacSha256Signer::new(SecretKey::new(secret).unwrap())
    }

    #[test]
    fn deterministic_signing() {
        let signer = signer("s");
        let sig1 = signer.sign(b"u1|a1|T").unwrap();
        let sig2 = signer.sign(b"u1|a1|T").unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn matches_rfc4231_test_case_2() {
        let signer = signer("Jefe");
        let sig = signer.sign(b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(sig),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn signature_is_32_bytes() {
        let sig = signer("s").sign(b"data").unwrap();
        assert_eq!(sig.len(), 32);
    }

    #[test]
    fn verify_accepts_own_signature() {
        let signer = signer("s");
        let sig = signer.sign(b"u1|a1|T").unwrap();
        assert!(signer.verify(b"u1|a1|T", &sig).unwrap());
    }

    #[test]
    fn verify_rejects_other_secret_and_truncation() {
        let sig = signer("secret1").sign(b"u1|a1|T").unwrap();
        assert!(!signer("secret2").verify(b"u1|a1|T", &sig).unwrap());
        assert!(!signer("secret1").verify(b"u1|a1|T", &sig[..16]).unwrap());
    }

    #[test]
    fn algorithm_is_hmac_sha256() {
        assert_eq!(signer("s").algorithm(), "hmac-sha256");
    }
}
