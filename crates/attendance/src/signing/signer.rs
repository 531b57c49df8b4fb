/// Trait for signing the canonical attendance message.
///
/// Implementations are sync; signing is CPU-bound.
/// For async backends (e.g. KMS), use `spawn_blocking`.
pub trait PayloadSigner: Send + Sync {
    /// Sign canonical bytes. Returns raw signature bytes.
    fn sign(&self, message: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Check `signature` against `message` in constant time.
    fn verify(&self, message: &[u8], signature: &[u8]) -> anyhow::Result<bool>;

    /// Algorithm identifier string (e.g. "hmac-sha256").
    fn algorithm(&self) -> &str;
}
