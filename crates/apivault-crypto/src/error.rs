use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The sealed input is structurally too short to even contain a nonce
    /// and tag. Distinct from an authentication failure: nothing was
    /// decrypted, the blob is truncated.
    #[error("sealed blob too short: {len} bytes (minimum {min})")]
    Malformed { len: usize, min: usize },

    /// The authentication tag did not verify. Covers both a tampered
    /// ciphertext and a key that no longer matches the blob.
    #[error("decryption failed: authentication tag mismatch or wrong key")]
    AuthenticationFailure,

    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("decrypted data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
