//! apivault-crypto: machine-bound sealing for the apivault secret store
//!
//! Pipeline: machine identifiers → SHA-256 salt → Argon2id → 256-bit vault key
//!           → XChaCha20-Poly1305 seal/open of the whole secret blob
//!
//! The vault key is recomputed from the host environment on every
//! construction and never touches disk. Sealed blob format (binary):
//!
//! ```text
//! [24 bytes: random nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```

pub mod cipher;
pub mod error;
pub mod kdf;
pub mod machine;

pub use cipher::VaultCipher;
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_vault_key, KdfParams, VaultKey};
pub use machine::machine_salt;

/// Size of a vault key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of the machine salt (SHA-256 output)
pub const SALT_SIZE: usize = 32;
