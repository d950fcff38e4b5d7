use std::path::PathBuf;

use apivault_crypto::CryptoError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SecretError>;

#[derive(Debug, Error)]
pub enum SecretError {
    /// The named (or referenced) secret is not stored. Recoverable:
    /// callers treat this as "not configured yet".
    #[error("no secret stored for {0}")]
    NotFound(String),

    /// The sealed blob failed to verify: tampering, ciphertext corruption,
    /// or a vault key that no longer matches because a machine identifier
    /// changed since the blob was written. Never retried.
    #[error("could not decrypt secrets (authentication failed, possibly due to a machine change)")]
    AuthenticationFailure,

    /// The blob is structurally broken (truncated below the minimum size).
    #[error("secrets file is malformed: {0}")]
    Malformed(String),

    /// The blob path is a symlink. Refused outright; the message names the
    /// path and nothing else.
    #[error("secrets file {} is a symlink - refusing for security", .0.display())]
    SymlinkRejected(PathBuf),

    /// A reference string that does not parse or carries an unknown
    /// backend tag. Caller bug or corrupted persisted config.
    #[error("invalid secret reference: {0}")]
    InvalidReference(String),

    /// The backend a reference names cannot be reached right now. Distinct
    /// from `NotFound`: the secret may well exist but be unreachable.
    #[error("secret backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Seal-side or key-derivation failure. Catastrophic, not retried.
    #[error("encryption failed: {0}")]
    Crypto(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CryptoError> for SecretError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Malformed { len, min } => SecretError::Malformed(format!(
                "sealed blob too short: {len} bytes (minimum {min})"
            )),
            CryptoError::AuthenticationFailure => SecretError::AuthenticationFailure,
            other => SecretError::Crypto(other.to_string()),
        }
    }
}
