//! Encrypted file vault: one sealed blob holding every file-backed secret.
//!
//! Every operation is a whole-file cycle: lock → read → open → act →
//! seal → replace. The blob lives at `<data_dir>/secrets.enc` with mode
//! 0600 inside a 0700 directory; a sibling `secrets.enc.lock` carries an
//! advisory lock so two processes cannot interleave their
//! read-modify-write cycles. Rewrites go through a temp file and `rename`
//! so a crash mid-write leaves the previous blob intact.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use secrecy::SecretString;
use tracing::debug;
use zeroize::Zeroizing;

use apivault_crypto::{derive_vault_key, machine_salt, KdfParams, VaultCipher};

use crate::codec;
use crate::error::{Result, SecretError};
use crate::manager::SecretBackend;

/// Argon2id password input. Compiled in deliberately: the machine salt
/// supplies per-machine uniqueness, and the protection boundary is file
/// permissions plus local code execution, not secrecy of this constant.
const APP_SECRET: &[u8] = b"apivault/v1";

/// Blob file name inside the data directory.
const SECRETS_FILE: &str = "secrets.enc";

/// Raw key file written by pre-vault releases; removed on sight.
const LEGACY_KEY_FILE: &str = ".key";

/// File-backed secret store sealed under a machine-bound key.
pub struct FileStore {
    data_dir: PathBuf,
    cipher: VaultCipher,
}

impl FileStore {
    /// Open (or bootstrap) the vault under `data_dir`.
    ///
    /// Derives the vault key (roughly 50 ms at the default Argon2id cost)
    /// and keeps the cipher for the lifetime of this store. The key never
    /// touches disk.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_params(data_dir, &KdfParams::default())
    }

    /// Like [`FileStore::new`] with explicit KDF parameters. A blob sealed
    /// under one parameter set cannot be opened under another.
    pub fn with_params(data_dir: impl Into<PathBuf>, params: &KdfParams) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&data_dir, std::fs::Permissions::from_mode(0o700))?;
        }

        // Pre-vault releases persisted a raw key file; never leave one behind.
        let _ = std::fs::remove_file(data_dir.join(LEGACY_KEY_FILE));

        let salt = machine_salt();
        let key = derive_vault_key(APP_SECRET, &salt, params)?;

        Ok(Self {
            data_dir,
            cipher: VaultCipher::new(&key),
        })
    }

    /// Default per-user vault directory: `$XDG_DATA_HOME/apivault`,
    /// falling back to `~/.local/share/apivault`.
    pub fn default_data_dir() -> PathBuf {
        std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
                PathBuf::from(home).join(".local/share")
            })
            .join("apivault")
    }

    /// Path of the sealed blob file.
    pub fn secrets_path(&self) -> PathBuf {
        self.data_dir.join(SECRETS_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.data_dir.join(format!("{SECRETS_FILE}.lock"))
    }

    fn load_all(&self) -> Result<BTreeMap<String, String>> {
        let path = self.secrets_path();

        // Lstat first: never follow a symlink planted at the blob path.
        let meta = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // First use: nothing stored yet.
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        if meta.file_type().is_symlink() {
            return Err(SecretError::SymlinkRejected(path));
        }

        let sealed = std::fs::read(&path)?;
        let plaintext = Zeroizing::new(self.cipher.open(&sealed)?);
        Ok(codec::parse(&plaintext))
    }

    fn save_all(&self, secrets: &BTreeMap<String, String>) -> Result<()> {
        let plaintext = Zeroizing::new(codec::serialize(secrets));
        let sealed = self.cipher.seal(&plaintext)?;

        // Write-then-rename: the previous blob stays intact until the new
        // one is fully on disk.
        let tmp = self
            .data_dir
            .join(format!("{SECRETS_FILE}.tmp.{}", uuid::Uuid::new_v4()));

        let mut opts = OpenOptions::new();
        opts.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }

        let mut tmp_file = opts.open(&tmp)?;
        if let Err(e) = tmp_file
            .write_all(&sealed)
            .and_then(|()| tmp_file.sync_all())
        {
            drop(tmp_file);
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        drop(tmp_file);

        if let Err(e) = std::fs::rename(&tmp, self.secrets_path()) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(entries = secrets.len(), "rewrote secrets blob");
        Ok(())
    }
}

impl SecretBackend for FileStore {
    fn store(&self, name: &str, secret: &str) -> Result<()> {
        let _lock = VaultLock::exclusive(&self.lock_path())?;

        let mut secrets = self.load_all()?;
        secrets.insert(name.to_string(), secret.to_string());
        self.save_all(&secrets)?;

        debug!(name, "stored secret in file vault");
        Ok(())
    }

    fn retrieve(&self, name: &str) -> Result<SecretString> {
        let _lock = VaultLock::shared(&self.lock_path())?;

        let secrets = self.load_all()?;
        match secrets.get(name) {
            Some(value) => Ok(SecretString::from(value.clone())),
            None => Err(SecretError::NotFound(name.to_string())),
        }
    }

    fn delete(&self, name: &str) -> Result<()> {
        let _lock = VaultLock::exclusive(&self.lock_path())?;

        let mut secrets = self.load_all()?;
        secrets.remove(name);
        self.save_all(&secrets)?;

        debug!(name, "deleted secret from file vault");
        Ok(())
    }
}

/// Advisory cross-process lock on the vault, taken on a sibling lock file
/// and held for the duration of one read-modify-write cycle. Released on
/// drop.
struct VaultLock {
    file: File,
}

impl VaultLock {
    fn exclusive(path: &Path) -> Result<Self> {
        let file = Self::open(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    fn shared(path: &Path) -> Result<Self> {
        let file = Self::open(path)?;
        file.lock_shared()?;
        Ok(Self { file })
    }

    fn open(path: &Path) -> Result<File> {
        let mut opts = OpenOptions::new();
        opts.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        Ok(opts.open(path)?)
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
