//! Store passphrase stretching.
//!
//! The credential store wants a 32-byte master key, not a passphrase.
//! This module bridges the two: a per-data-directory salt file plus an
//! Argon2id stretch turn whatever the user typed into the key the engine
//! opens with. The salt is not a secret; losing it is what loses the
//! store, so it is written once and never rotated.

use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::info;

use parallel_crypto::kdf::{derive_key, Argon2Params, DerivedKey};
use parallel_types::{ParallelError, Result};

/// File inside the data directory holding the hex-encoded salt.
pub const SALT_FILE: &str = "store.salt";

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Reads the salt for `dir`, creating one on the first run.
///
/// The salt file is written atomically (temp file + rename) so a crash
/// mid-write can never leave a half-salt that silently derives a
/// different key.
///
/// # Errors
///
/// Returns [`ParallelError::StorageUnavailable`] when the file cannot be
/// read or written, and [`ParallelError::ConfigError`] when an existing
/// file does not hold exactly [`SALT_LEN`] hex-encoded bytes.
pub fn load_or_create_salt(dir: &Path) -> Result<Vec<u8>> {
    let path = dir.join(SALT_FILE);
    if path.exists() {
        return read_salt(&path);
    }

    let mut salt = vec![0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    write_salt(&path, &salt)?;
    info!(path = %path.display(), "store salt created");
    Ok(salt)
}

/// Stretches `passphrase` into the storage master key.
///
/// # Errors
///
/// Returns [`ParallelError::ConfigError`] when the passphrase is blank,
/// and whatever the Argon2id derivation itself reports.
pub fn stretch_passphrase(passphrase: &str, salt: &[u8]) -> Result<DerivedKey> {
    if passphrase.trim().is_empty() {
        return Err(ParallelError::ConfigError {
            reason: "store passphrase must not be empty".into(),
        });
    }
    derive_key(passphrase.as_bytes(), salt, &Argon2Params::default())
}

fn read_salt(path: &PathBuf) -> Result<Vec<u8>> {
    let text = std::fs::read_to_string(path).map_err(|e| ParallelError::StorageUnavailable {
        reason: format!("failed to read salt file: {e}"),
    })?;
    let salt = hex::decode(text.trim()).map_err(|e| ParallelError::ConfigError {
        reason: format!("salt file is not valid hex: {e}"),
    })?;
    if salt.len() != SALT_LEN {
        return Err(ParallelError::ConfigError {
            reason: format!("salt file must hold {SALT_LEN} bytes, found {}", salt.len()),
        });
    }
    Ok(salt)
}

fn write_salt(path: &Path, salt: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("salt.tmp");
    std::fs::write(&tmp_path, hex::encode(salt)).map_err(|e| {
        ParallelError::StorageUnavailable {
            reason: format!("failed to write salt file: {e}"),
        }
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        ParallelError::StorageUnavailable {
            reason: format!("failed to rename salt file: {e}"),
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_dir() -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "parallel-store-key-test-{}-{}",
            std::process::id(),
            id,
        ));
        let _ = std::fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn salt_survives_reopening() -> Result<()> {
        let dir = temp_dir();
        let first = load_or_create_salt(&dir)?;
        let second = load_or_create_salt(&dir)?;
        assert_eq!(first, second);
        assert_eq!(first.len(), SALT_LEN);
        Ok(())
    }

    #[test]
    fn each_directory_gets_its_own_salt() -> Result<()> {
        let a = load_or_create_salt(&temp_dir())?;
        let b = load_or_create_salt(&temp_dir())?;
        assert_ne!(a, b);
        Ok(())
    }

    #[test]
    fn salt_file_is_hex_text() -> Result<()> {
        let dir = temp_dir();
        let salt = load_or_create_salt(&dir)?;
        let text = std::fs::read_to_string(dir.join(SALT_FILE)).unwrap();
        assert_eq!(hex::decode(text.trim()).unwrap(), salt);
        Ok(())
    }

    #[test]
    fn corrupt_salt_file_is_rejected() {
        let dir = temp_dir();
        std::fs::write(dir.join(SALT_FILE), "not hex at all").unwrap();
        let err = load_or_create_salt(&dir).unwrap_err();
        assert!(matches!(err, ParallelError::ConfigError { .. }));
    }

    #[test]
    fn truncated_salt_file_is_rejected() {
        let dir = temp_dir();
        std::fs::write(dir.join(SALT_FILE), "aabb").unwrap();
        let err = load_or_create_salt(&dir).unwrap_err();
        assert!(matches!(err, ParallelError::ConfigError { .. }));
    }

    #[test]
    fn stretch_is_deterministic_per_salt() -> Result<()> {
        let salt = [0x42u8; SALT_LEN];
        let a = stretch_passphrase("correct horse battery", &salt)?;
        let b = stretch_passphrase("correct horse battery", &salt)?;
        assert_eq!(a.as_bytes(), b.as_bytes());
        Ok(())
    }

    #[test]
    fn different_passphrases_derive_different_keys() -> Result<()> {
        let salt = [0x42u8; SALT_LEN];
        let a = stretch_passphrase("one passphrase", &salt)?;
        let b = stretch_passphrase("another passphrase", &salt)?;
        assert_ne!(a.as_bytes(), b.as_bytes());
        Ok(())
    }

    #[test]
    fn blank_passphrase_is_rejected() {
        let salt = [0x42u8; SALT_LEN];
        assert!(stretch_passphrase("", &salt).is_err());
        assert!(stretch_passphrase("   ", &salt).is_err());
    }
}
