//! Machine salt: a stable fingerprint of the host, used as the KDF salt.
//!
//! Concatenates whichever of {systemd machine id, hostname, home directory
//! path, numeric uid} are obtainable and hashes the result with SHA-256.
//! Identifiers that cannot be read are omitted rather than treated as
//! errors, so the function is total: it always returns 32 bytes, and the
//! same machine yields the same salt across process runs.
//!
//! Changing a contributing identifier (OS reinstall, renamed host, moved
//! home directory) produces a different salt and therefore a different
//! vault key, leaving previously sealed blobs unreadable.

use sha2::{Digest, Sha256};

use crate::SALT_SIZE;

/// systemd machine id, present on most Linux systems
const MACHINE_ID_PATH: &str = "/etc/machine-id";

/// Compute the 32-byte machine salt for this host.
pub fn machine_salt() -> [u8; SALT_SIZE] {
    let mut combined = String::new();

    if let Ok(id) = std::fs::read_to_string(MACHINE_ID_PATH) {
        combined.push_str(&id);
    }

    if let Ok(name) = hostname::get() {
        combined.push_str(&name.to_string_lossy());
    }

    if let Ok(home) = std::env::var("HOME") {
        combined.push_str(&home);
    }

    #[cfg(unix)]
    {
        let uid = unsafe { libc::getuid() };
        combined.push_str(&uid.to_string());
    }

    Sha256::digest(combined.as_bytes()).into()
}
