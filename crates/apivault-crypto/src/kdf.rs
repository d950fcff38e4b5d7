//! Key derivation: application secret + machine salt → vault key via Argon2id

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_SIZE, SALT_SIZE};

/// A 256-bit vault key derived from the application secret and machine salt.
///
/// Zeroized on drop to prevent secrets lingering in memory.
#[derive(Clone)]
pub struct VaultKey {
    bytes: [u8; KEY_SIZE],
}

impl VaultKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for VaultKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Argon2id parameters for KDF
#[derive(Debug, Clone)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub mem_cost_kib: u32,
    /// Time cost / iterations (default: 3)
    pub time_cost: u32,
    /// Parallelism (default: 4)
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            mem_cost_kib: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Derive a 256-bit vault key from an application secret and the machine
/// salt using Argon2id.
///
/// The secret is the fixed component compiled into the consuming binary;
/// the salt carries the per-machine uniqueness. Derivation is
/// deterministic, so the same (secret, salt, params) triple always yields
/// the same key; this is what lets a fresh process open blobs sealed by
/// an earlier run. At the default parameters a derivation costs on the
/// order of 50 ms, paid once per store construction.
pub fn derive_vault_key(
    secret: &[u8],
    salt: &[u8; SALT_SIZE],
    params: &KdfParams,
) -> CryptoResult<VaultKey> {
    let argon2_params = Params::new(
        params.mem_cost_kib,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::Kdf(format!("invalid Argon2id params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(secret, salt, &mut key)
        .map_err(|e| CryptoError::Kdf(format!("Argon2id KDF failed: {e}")))?;

    Ok(VaultKey::from_bytes(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Use fast params for testing
    fn fast_params() -> KdfParams {
        KdfParams {
            mem_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_kdf_deterministic() {
        let salt = [1u8; SALT_SIZE];
        let params = fast_params();

        let key1 = derive_vault_key(b"app-secret", &salt, &params).unwrap();
        let key2 = derive_vault_key(b"app-secret", &salt, &params).unwrap();

        assert_eq!(
            key1.as_bytes(),
            key2.as_bytes(),
            "KDF must be deterministic"
        );
    }

    #[test]
    fn test_kdf_different_secrets() {
        let salt = [1u8; SALT_SIZE];
        let params = fast_params();

        let key1 = derive_vault_key(b"secret-a", &salt, &params).unwrap();
        let key2 = derive_vault_key(b"secret-b", &salt, &params).unwrap();

        assert_ne!(
            key1.as_bytes(),
            key2.as_bytes(),
            "different secrets must produce different keys"
        );
    }

    #[test]
    fn test_kdf_different_salts() {
        let params = fast_params();

        let key1 = derive_vault_key(b"same-secret", &[1u8; SALT_SIZE], &params).unwrap();
        let key2 = derive_vault_key(b"same-secret", &[2u8; SALT_SIZE], &params).unwrap();

        assert_ne!(
            key1.as_bytes(),
            key2.as_bytes(),
            "different salts must produce different keys"
        );
    }

    #[test]
    fn test_vault_key_debug_redacted() {
        let key = VaultKey::from_bytes([7u8; KEY_SIZE]);
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains('7'));
    }
}
