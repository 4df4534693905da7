//! BIP-39 reference vectors.
//!
//! Entropy, phrase, and seed values come from the Trezor reference vector
//! set; seed derivations use the passphrase "TREZOR".

use parallel_crypto::mnemonic::{entropy_to_mnemonic, mnemonic_to_seed, Mnemonic};
use parallel_types::ParallelError;

fn phrase_for(entropy: &[u8]) -> String {
    let mnemonic = entropy_to_mnemonic(entropy).unwrap();
    mnemonic.as_str().to_string()
}

fn seed_hex(phrase: &str, passphrase: &str) -> String {
    let mnemonic = Mnemonic::from_phrase(phrase).unwrap();
    let seed = mnemonic_to_seed(&mnemonic, passphrase).unwrap();
    hex::encode(seed.as_bytes())
}

// =============================================================================
// Entropy to phrase
// =============================================================================

#[test]
fn all_zero_entropy_twelve_words() {
    assert_eq!(
        phrase_for(&[0x00; 16]),
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
    );
}

#[test]
fn all_7f_entropy_twelve_words() {
    assert_eq!(
        phrase_for(&[0x7f; 16]),
        "legal winner thank year wave sausage worth useful legal winner thank yellow"
    );
}

#[test]
fn all_ff_entropy_twelve_words() {
    assert_eq!(
        phrase_for(&[0xff; 16]),
        "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong"
    );
}

#[test]
fn all_zero_entropy_twenty_four_words() {
    let expected = format!("{} art", "abandon ".repeat(23).trim_end());
    assert_eq!(phrase_for(&[0x00; 32]), expected);
}

#[test]
fn all_ff_entropy_twenty_four_words() {
    let expected = format!("{} vote", "zoo ".repeat(23).trim_end());
    assert_eq!(phrase_for(&[0xff; 32]), expected);
}

#[test]
fn all_7f_entropy_twenty_four_words() {
    assert_eq!(
        phrase_for(&[0x7f; 32]),
        "legal winner thank year wave sausage worth useful \
         legal winner thank year wave sausage worth useful \
         legal winner thank year wave sausage worth title"
    );
}

// =============================================================================
// Phrase to seed
// =============================================================================

#[test]
fn trezor_seed_for_twelve_zero_entropy_words() {
    let phrase = phrase_for(&[0x00; 16]);
    assert_eq!(
        seed_hex(&phrase, "TREZOR"),
        "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
    );
}

#[test]
fn trezor_seed_for_twenty_four_zero_entropy_words() {
    let phrase = phrase_for(&[0x00; 32]);
    assert_eq!(
        seed_hex(&phrase, "TREZOR"),
        "bda85446c68413707090a52022edd26a1c9462295029f2e60cd7c4f2bbd3097170af7a4d73245cafa9c3cca8d561a7c3de6f5d4a10be8ed2a5e608d68f92fcc8"
    );
}

#[test]
fn empty_passphrase_differs_from_trezor_passphrase() {
    let phrase = phrase_for(&[0x00; 16]);
    assert_ne!(seed_hex(&phrase, ""), seed_hex(&phrase, "TREZOR"));
}

// =============================================================================
// Import validation
// =============================================================================

#[test]
fn eighteen_word_trezor_phrases_are_rejected_on_import() {
    // Valid BIP-39, but imports accept only 12 or 24 words.
    let phrase = entropy_to_mnemonic(&[0x00; 24]).unwrap();
    assert_eq!(phrase.word_count(), 18);
    assert!(matches!(
        Mnemonic::from_phrase(phrase.as_str()),
        Err(ParallelError::InvalidMnemonic { .. })
    ));
}
