//! Backend selection and the durable reference scheme.
//!
//! The manager probes the OS keyring once at construction; the choice
//! holds for the process lifetime so a reference written this session
//! stays resolvable by its tag even if keyring availability flips
//! mid-session. References (`keyring:<name>` / `file:<name>`) are what
//! callers persist into their own configuration, and resolution always
//! goes through the backend the tag names, whatever backend is currently
//! active, because the reference may have been written by an earlier
//! session under different keyring availability.

use std::cell::OnceCell;
use std::path::PathBuf;

use secrecy::SecretString;
use tracing::debug;

use crate::error::{Result, SecretError};
use crate::file::FileStore;
use crate::keychain::KeychainStore;

/// Reference tag for keyring-backed secrets.
pub const STORAGE_KEYRING: &str = "keyring";

/// Reference tag for file-vault-backed secrets.
pub const STORAGE_FILE: &str = "file";

/// Common contract of the two storage backends.
///
/// Selected by a runtime capability probe, not compile-time configuration,
/// so the seam is a trait object behind [`SecretManager`].
pub trait SecretBackend {
    /// Store (upsert) a secret under the given name.
    fn store(&self, name: &str, secret: &str) -> Result<()>;

    /// Retrieve a secret by name; absent names are `NotFound`.
    fn retrieve(&self, name: &str) -> Result<SecretString>;

    /// Delete a secret by name. Deleting an absent name is not an error.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Storage-agnostic secret manager.
pub struct SecretManager {
    use_keyring: bool,
    data_dir: PathBuf,
    keychain: KeychainStore,
    // Built on first use and cached: in keyring mode the file vault (and
    // its key derivation cost) is only paid when a `file:` reference
    // actually needs resolving.
    file_store: OnceCell<FileStore>,
}

impl SecretManager {
    /// Probe the keyring and fix the backend choice for this process.
    ///
    /// The file vault, when selected, lives under
    /// [`FileStore::default_data_dir`].
    pub fn new() -> Result<Self> {
        Self::with_data_dir(FileStore::default_data_dir())
    }

    /// Like [`SecretManager::new`] with an explicit vault directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let use_keyring = KeychainStore::probe();
        debug!(use_keyring, "selected secret backend");
        Self::build(data_dir.into(), use_keyring)
    }

    /// A manager pinned to the file vault, skipping the keyring probe.
    ///
    /// For headless environments (and tests) where no secret service
    /// should be touched. `keyring:` references still resolve through the
    /// keyring if one turns out to be reachable.
    pub fn file_only(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::build(data_dir.into(), false)
    }

    fn build(data_dir: PathBuf, use_keyring: bool) -> Result<Self> {
        let manager = Self {
            use_keyring,
            data_dir,
            keychain: KeychainStore::new(),
            file_store: OnceCell::new(),
        };
        if !manager.use_keyring {
            // The vault is the active backend: pay the key derivation now
            // so every later operation is cheap.
            manager.file_store()?;
        }
        Ok(manager)
    }

    /// Whether the OS keyring is the active backend. Status display only;
    /// control flow goes through the reference API.
    pub fn is_keyring_available(&self) -> bool {
        self.use_keyring
    }

    /// Store a secret via the active backend.
    pub fn store(&self, name: &str, secret: &str) -> Result<()> {
        self.active()?.store(name, secret)
    }

    /// Retrieve a secret from the active backend.
    pub fn retrieve(&self, name: &str) -> Result<SecretString> {
        self.active()?.retrieve(name)
    }

    /// Delete a secret from the active backend. Idempotent.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.active()?.delete(name)
    }

    /// Store a secret and return the durable `backend:name` reference for
    /// the caller to persist.
    pub fn store_with_reference(&self, name: &str, secret: &str) -> Result<String> {
        self.store(name, secret)?;

        let tag = if self.use_keyring {
            STORAGE_KEYRING
        } else {
            STORAGE_FILE
        };
        Ok(format!("{tag}:{name}"))
    }

    /// Resolve a `backend:name` reference, dispatching to the backend the
    /// tag names regardless of which backend is active.
    ///
    /// An unknown tag or a reference without a colon is
    /// [`SecretError::InvalidReference`]; a named backend that cannot be
    /// reached is [`SecretError::BackendUnavailable`], distinct from the
    /// secret simply not being stored.
    pub fn retrieve_by_reference(&self, reference: &str) -> Result<SecretString> {
        let (tag, name) = reference
            .split_once(':')
            .ok_or_else(|| SecretError::InvalidReference(reference.to_string()))?;

        match tag {
            STORAGE_KEYRING => self.keychain.retrieve(name),
            STORAGE_FILE => self.file_store()?.retrieve(name),
            _ => Err(SecretError::InvalidReference(reference.to_string())),
        }
    }

    fn active(&self) -> Result<&dyn SecretBackend> {
        if self.use_keyring {
            Ok(&self.keychain)
        } else {
            Ok(self.file_store()?)
        }
    }

    fn file_store(&self) -> Result<&FileStore> {
        if let Some(store) = self.file_store.get() {
            return Ok(store);
        }
        let store = FileStore::new(self.data_dir.clone()).map_err(|e| {
            SecretError::BackendUnavailable(format!(
                "file vault at {}: {e}",
                self.data_dir.display()
            ))
        })?;
        Ok(self.file_store.get_or_init(|| store))
    }
}
