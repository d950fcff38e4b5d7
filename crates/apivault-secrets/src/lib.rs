//! apivault-secrets: encrypted credential storage for API provider tokens
//!
//! Two interchangeable backends behind one manager:
//! - OS keyring (preferred when reachable): one native entry per secret
//! - Encrypted file vault: a single machine-bound blob at
//!   `$XDG_DATA_HOME/apivault/secrets.enc`
//!
//! The manager probes the keyring once at construction and hands out
//! durable `keyring:<name>` / `file:<name>` reference strings. A reference
//! resolves through the backend its tag names regardless of which backend
//! is active in the resolving session, so references written under one
//! keyring availability remain usable under another.

pub mod codec;
pub mod error;
pub mod file;
pub mod keychain;
pub mod manager;

pub use error::{Result, SecretError};
pub use file::FileStore;
pub use keychain::KeychainStore;
pub use manager::{SecretBackend, SecretManager, STORAGE_FILE, STORAGE_KEYRING};

/// Service name under which keyring entries are registered.
pub const SERVICE_NAME: &str = "apivault";
