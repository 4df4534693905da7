//! BIP-39 mnemonic generation, validation, and seed derivation.
//!
//! Wallet identity starts here: a 24-word English mnemonic is generated from
//! 32 bytes of OS entropy, and imports accept 12- or 24-word phrases. Seed
//! derivation follows BIP-39 PBKDF2 with an optional passphrase.

use bip39::Language;
use parallel_types::{ParallelError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Entropy length backing a freshly generated mnemonic. 32 bytes yields a
/// 24-word phrase.
const GENERATED_ENTROPY_LEN: usize = 32;

/// Word counts accepted on import.
const ACCEPTED_WORD_COUNTS: [usize; 2] = [12, 24];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A validated, whitespace-normalized BIP-39 phrase.
///
/// The inner string is zeroized on drop. `Mnemonic` intentionally implements
/// neither `Clone` nor `Debug`; the phrase leaves this type only through
/// [`Mnemonic::as_str`].
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic(String);

impl Mnemonic {
    /// Parses and validates a user-supplied phrase.
    ///
    /// Input is normalized first: surrounding whitespace is trimmed, runs of
    /// internal whitespace collapse to single spaces, and words are
    /// lowercased. The normalized phrase must contain exactly 12 or 24 words
    /// and carry a valid BIP-39 checksum.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::InvalidMnemonic`] when the word count is
    /// unsupported, a word is not in the English wordlist, or the checksum
    /// does not verify.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let normalized = normalize_phrase(phrase);
        let count = normalized.split_whitespace().count();
        if !ACCEPTED_WORD_COUNTS.contains(&count) {
            return Err(ParallelError::InvalidMnemonic {
                reason: format!("phrase must contain 12 or 24 words, found {count}"),
            });
        }
        bip39::Mnemonic::parse_in(Language::English, normalized.as_str()).map_err(|e| {
            ParallelError::InvalidMnemonic {
                reason: e.to_string(),
            }
        })?;
        Ok(Self(normalized))
    }

    /// Returns the normalized phrase.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of words in the phrase.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

/// A 64-byte BIP-39 seed, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; Seed::LEN]);

impl Seed {
    /// Seed length in bytes.
    pub const LEN: usize = 64;

    /// Wraps raw seed bytes, taking ownership of them.
    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Borrows the seed bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Generates a fresh 24-word mnemonic from 32 bytes of OS entropy.
///
/// # Errors
///
/// Returns [`ParallelError::InvalidMnemonic`] if encoding fails, which only
/// happens when the entropy length is unsupported and is therefore
/// unreachable for the fixed 32-byte input.
pub fn generate_mnemonic() -> Result<Mnemonic> {
    let mut entropy = [0u8; GENERATED_ENTROPY_LEN];
    OsRng.fill_bytes(&mut entropy);
    let mnemonic = entropy_to_mnemonic(&entropy);
    entropy.zeroize();
    mnemonic
}

/// Encodes raw entropy as a BIP-39 English phrase.
///
/// Accepts the entropy lengths BIP-39 defines (16, 20, 24, 28, or 32 bytes).
///
/// # Errors
///
/// Returns [`ParallelError::InvalidMnemonic`] for unsupported entropy
/// lengths.
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<Mnemonic> {
    let parsed = bip39::Mnemonic::from_entropy_in(Language::English, entropy).map_err(|e| {
        ParallelError::InvalidMnemonic {
            reason: e.to_string(),
        }
    })?;
    Ok(Mnemonic(parsed.to_string()))
}

/// Validates a phrase without retaining it.
///
/// # Errors
///
/// Same as [`Mnemonic::from_phrase`].
pub fn validate_mnemonic(phrase: &str) -> Result<()> {
    Mnemonic::from_phrase(phrase).map(|_| ())
}

/// Derives the 64-byte BIP-39 seed for a mnemonic.
///
/// The passphrase is the BIP-39 extension word; wallets created here use the
/// empty string.
///
/// # Errors
///
/// Returns [`ParallelError::InvalidMnemonic`] if the phrase no longer parses,
/// which cannot happen for a [`Mnemonic`] built by this module.
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Result<Seed> {
    let parsed = bip39::Mnemonic::parse_in(Language::English, mnemonic.as_str()).map_err(|e| {
        ParallelError::InvalidMnemonic {
            reason: e.to_string(),
        }
    })?;
    Ok(Seed(parsed.to_seed(passphrase)))
}

/// Trims, lowercases, and collapses internal whitespace.
pub fn normalize_phrase(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
