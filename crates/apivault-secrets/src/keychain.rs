//! OS keyring adapter: one native entry per secret.
//!
//! Cross-platform via the `keyring` crate (macOS Keychain Services, Linux
//! Secret Service over D-Bus, Windows Credential Manager). Availability is
//! probed by reading a deliberately nonexistent entry: `NoEntry` proves
//! the service answered, any other error means it is unreachable.

use secrecy::SecretString;
use tracing::debug;
use zeroize::Zeroize;

use crate::error::{Result, SecretError};
use crate::manager::SecretBackend;
use crate::SERVICE_NAME;

/// Entry name used only by the availability probe; never written.
const PROBE_ENTRY: &str = "apivault_probe_nonexistent";

/// Per-secret storage in the platform secret service.
#[derive(Debug, Default)]
pub struct KeychainStore;

impl KeychainStore {
    pub fn new() -> Self {
        Self
    }

    /// Whether the OS keyring service is reachable.
    ///
    /// Probed once per manager construction, not per call.
    pub fn probe() -> bool {
        match keyring::Entry::new(SERVICE_NAME, PROBE_ENTRY) {
            Ok(entry) => matches!(entry.get_password(), Err(keyring::Error::NoEntry)),
            Err(_) => false,
        }
    }

    fn entry(&self, name: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(SERVICE_NAME, name)
            .map_err(|e| SecretError::BackendUnavailable(format!("keyring entry creation: {e}")))
    }
}

impl SecretBackend for KeychainStore {
    fn store(&self, name: &str, secret: &str) -> Result<()> {
        self.entry(name)?
            .set_password(secret)
            .map_err(|e| {
                SecretError::BackendUnavailable(format!("keyring store for '{name}': {e}"))
            })?;
        debug!(name, "stored secret in OS keyring");
        Ok(())
    }

    fn retrieve(&self, name: &str) -> Result<SecretString> {
        match self.entry(name)?.get_password() {
            Ok(mut password) => {
                let secret = SecretString::from(password.clone());
                password.zeroize();
                Ok(secret)
            }
            Err(keyring::Error::NoEntry) => Err(SecretError::NotFound(name.to_string())),
            Err(e) => Err(SecretError::BackendUnavailable(format!(
                "keyring get for '{name}': {e}"
            ))),
        }
    }

    fn delete(&self, name: &str) -> Result<()> {
        match self.entry(name)?.delete_credential() {
            Ok(()) => {
                debug!(name, "deleted secret from OS keyring");
                Ok(())
            }
            // Already absent: deletion is idempotent.
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretError::BackendUnavailable(format!(
                "keyring delete for '{name}': {e}"
            ))),
        }
    }
}
