//! Integration tests for the encrypted file vault and the secret manager.
//!
//! Exercises the full store → sealed blob → retrieve path across
//! independent store instances, the way separate CLI invocations would use
//! it, plus the symlink guard and the reference scheme end to end.

use apivault_crypto::KdfParams;
use apivault_secrets::{FileStore, SecretBackend, SecretError, SecretManager};
use secrecy::ExposeSecret;
use tempfile::TempDir;

fn fast_params() -> KdfParams {
    KdfParams {
        mem_cost_kib: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

/// A second store instance on the same data dir must decrypt what the
/// first sealed: the key is re-derived from the machine, not persisted.
#[test]
fn key_stable_across_store_instances() {
    let tmp = TempDir::new().unwrap();

    let first = FileStore::with_params(tmp.path(), &fast_params()).unwrap();
    first.store("openai", "sk-abc123").unwrap();
    drop(first);

    let second = FileStore::with_params(tmp.path(), &fast_params()).unwrap();
    let secret = second.retrieve("openai").unwrap();
    assert_eq!(secret.expose_secret(), "sk-abc123");
}

/// No key material may land in the data directory; the blob is the only
/// artifact besides the lock file.
#[test]
fn vault_dir_holds_no_key_material() {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::with_params(tmp.path(), &fast_params()).unwrap();
    store.store("p", "k").unwrap();

    let names: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();

    for name in &names {
        assert!(
            name == "secrets.enc" || name == "secrets.enc.lock",
            "unexpected file in vault dir: {name}"
        );
    }
}

/// Store/retrieve/delete across instances, values exercising the codec's
/// escaping (`=`, newline, backslash, empty).
#[test]
fn lifecycle_with_awkward_values() {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::with_params(tmp.path(), &fast_params()).unwrap();

    let cases = [
        ("equals", "sk-other=456"),
        ("newline", "first\nsecond"),
        ("backslash", "C:\\keys\\api"),
        ("empty", ""),
    ];
    for (name, value) in &cases {
        store.store(name, value).unwrap();
    }

    let reopened = FileStore::with_params(tmp.path(), &fast_params()).unwrap();
    for (name, value) in &cases {
        assert_eq!(
            reopened.retrieve(name).unwrap().expose_secret(),
            *value,
            "value for {name} must round-trip"
        );
    }

    reopened.delete("equals").unwrap();
    assert!(matches!(
        reopened.retrieve("equals"),
        Err(SecretError::NotFound(_))
    ));
    assert_eq!(
        reopened.retrieve("newline").unwrap().expose_secret(),
        "first\nsecond"
    );
}

/// The guard must fire even when the symlink target is a valid blob that
/// the store's own key could open.
#[cfg(unix)]
#[test]
fn symlink_to_valid_blob_is_rejected() {
    let victim_dir = TempDir::new().unwrap();
    let victim = FileStore::with_params(victim_dir.path(), &fast_params()).unwrap();
    victim.store("openai", "sk-victim").unwrap();

    let attacker_dir = TempDir::new().unwrap();
    let store = FileStore::with_params(attacker_dir.path(), &fast_params()).unwrap();
    std::os::unix::fs::symlink(victim.secrets_path(), store.secrets_path()).unwrap();

    let result = store.retrieve("openai");
    assert!(
        matches!(result, Err(SecretError::SymlinkRejected(_))),
        "symlinked blob must be refused, got: {result:?}"
    );

    // Mutations go through the same guard.
    let result = store.store("openai", "sk-overwrite");
    assert!(matches!(result, Err(SecretError::SymlinkRejected(_))));
}

/// A `file:` reference written by one session resolves in a fresh one.
#[test]
fn reference_resolves_across_manager_instances() {
    let tmp = TempDir::new().unwrap();

    let first = SecretManager::file_only(tmp.path()).unwrap();
    let reference = first.store_with_reference("kimi", "sk-other=456").unwrap();
    assert_eq!(reference, "file:kimi");
    drop(first);

    let second = SecretManager::file_only(tmp.path()).unwrap();
    let secret = second.retrieve_by_reference(&reference).unwrap();
    assert_eq!(secret.expose_secret(), "sk-other=456");
}

/// Blob corruption surfaces as an authentication failure, not as an empty
/// vault or a partial read.
#[test]
fn corrupted_blob_fails_closed() {
    let tmp = TempDir::new().unwrap();
    let store = FileStore::with_params(tmp.path(), &fast_params()).unwrap();
    store.store("a", "1").unwrap();
    store.store("b", "2").unwrap();

    let path = store.secrets_path();
    let mut raw = std::fs::read(&path).unwrap();
    let mid = raw.len() / 2;
    raw[mid] ^= 0x80;
    std::fs::write(&path, &raw).unwrap();

    for name in ["a", "b"] {
        assert!(matches!(
            store.retrieve(name),
            Err(SecretError::AuthenticationFailure)
        ));
    }
}
