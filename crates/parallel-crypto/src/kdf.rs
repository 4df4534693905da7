//! Password-based key derivation using Argon2id.
//!
//! The credential store stretches its unlock secret through Argon2id before
//! any encryption key is produced. Parameters are tunable so tests can run
//! with cheap settings while production uses the defaults.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::{Zeroize, ZeroizeOnDrop};

use parallel_types::{ParallelError, Result};

/// Salts shorter than this are rejected outright.
pub const MIN_SALT_LEN: usize = 8;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Lanes of parallelism.
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

/// A 32-byte key stretched from a password, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; DerivedKey::LEN]);

impl DerivedKey {
    /// Output length in bytes.
    pub const LEN: usize = 32;

    /// Borrows the derived key bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

/// Stretches `password` into a 32-byte key.
///
/// # Errors
///
/// Returns [`ParallelError::ConfigError`] when the salt is too short or the
/// cost parameters are out of Argon2's accepted range, and
/// [`ParallelError::SigningError`] if the derivation itself fails.
pub fn derive_key(password: &[u8], salt: &[u8], params: &Argon2Params) -> Result<DerivedKey> {
    if salt.len() < MIN_SALT_LEN {
        return Err(ParallelError::ConfigError {
            reason: format!("salt must be at least {MIN_SALT_LEN} bytes"),
        });
    }
    let params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(DerivedKey::LEN),
    )
    .map_err(|e| ParallelError::ConfigError {
        reason: format!("invalid argon2 parameters: {e}"),
    })?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; DerivedKey::LEN];
    argon2
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| ParallelError::SigningError {
            reason: format!("argon2 derivation failed: {e}"),
        })?;
    Ok(DerivedKey(output))
}
