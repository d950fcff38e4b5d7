//! Whole-blob sealing with XChaCha20-Poly1305.
//!
//! Sealed format (binary):
//! ```text
//! [24 bytes: random nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```
//!
//! No associated data is bound: the vault seals one blob per rewrite, so
//! there is no position or identity to authenticate beyond the blob
//! itself. `open` distinguishes a structurally short input (`Malformed`)
//! from a failed tag check (`AuthenticationFailure`), which covers both
//! tampering and a key rotated by a machine-identifier change.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::VaultKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// AEAD wrapper around a derived vault key.
///
/// Construct once and reuse: the expensive step is deriving the key, and
/// the cipher instance is cheap to hold for the process lifetime.
pub struct VaultCipher {
    cipher: XChaCha20Poly1305,
}

impl VaultCipher {
    pub fn new(key: &VaultKey) -> Self {
        Self {
            cipher: XChaCha20Poly1305::new(key.as_bytes().into()),
        }
    }

    /// Seal a plaintext blob under a fresh random nonce.
    ///
    /// Returns `[24-byte nonce][ciphertext][16-byte tag]`. Sealing the same
    /// plaintext twice produces different output.
    pub fn seal(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Open a sealed blob produced by [`VaultCipher::seal`].
    ///
    /// An input shorter than nonce + tag is `Malformed`; a tag that does
    /// not verify is `AuthenticationFailure`.
    pub fn open(&self, sealed: &[u8]) -> CryptoResult<Vec<u8>> {
        if sealed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Malformed {
                len: sealed.len(),
                min: NONCE_SIZE + TAG_SIZE,
            });
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        let nonce = XNonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::AuthenticationFailure)
    }

    /// Seal a string and base64-encode the result.
    pub fn seal_str(&self, plaintext: &str) -> CryptoResult<String> {
        Ok(BASE64.encode(self.seal(plaintext.as_bytes())?))
    }

    /// Decode a base64 string, open it, and return the UTF-8 plaintext.
    pub fn open_str(&self, sealed: &str) -> CryptoResult<String> {
        let data = BASE64.decode(sealed)?;
        let plaintext = self.open(&data)?;
        Ok(String::from_utf8(plaintext)?)
    }
}
