//! Mnemonic backup ceremony.
//!
//! Revealing the recovery phrase follows a strict state machine so a
//! caller cannot skip the confirmation step:
//!
//! ```text
//! ShowMnemonic → ConfirmMnemonic → Complete
//! ```
//!
//! The phrase is held in memory only for the duration of the flow and
//! is zeroized when the [`BackupFlow`] completes or drops.

use parallel_types::{ParallelError, Result};
use zeroize::Zeroize;

use crate::manager::WalletManager;
use crate::pin::Pin;

// ---------------------------------------------------------------------------
// BackupState
// ---------------------------------------------------------------------------

/// States of the backup ceremony.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackupState {
    /// Phrase is available for display.
    ShowMnemonic,
    /// Caller acknowledged viewing; awaiting re-entry.
    ConfirmMnemonic,
    /// Re-entry matched. Flow is finished.
    Complete,
}

// ---------------------------------------------------------------------------
// BackupFlow
// ---------------------------------------------------------------------------

/// State machine for one backup ceremony.
///
/// Created by [`export_backup`]. The phrase is zeroized on drop
/// regardless of the state reached.
pub struct BackupFlow {
    state: BackupState,
    /// The recovery phrase. Zeroized on drop.
    phrase: String,
}

impl Drop for BackupFlow {
    fn drop(&mut self) {
        self.phrase.zeroize();
    }
}

impl BackupFlow {
    /// Returns the current state.
    pub fn state(&self) -> BackupState {
        self.state
    }

    /// Returns the phrase for display.
    ///
    /// Only available in [`BackupState::ShowMnemonic`].
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::AuthError`] in any other state.
    pub fn mnemonic(&self) -> Result<&str> {
        if self.state != BackupState::ShowMnemonic {
            return Err(ParallelError::AuthError {
                reason: "mnemonic is only available in the ShowMnemonic state".into(),
            });
        }
        Ok(&self.phrase)
    }

    /// Acknowledges that the phrase was viewed and moves to
    /// [`BackupState::ConfirmMnemonic`].
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::AuthError`] unless currently in
    /// `ShowMnemonic`.
    pub fn acknowledge_shown(&mut self) -> Result<()> {
        if self.state != BackupState::ShowMnemonic {
            return Err(ParallelError::AuthError {
                reason: "can only acknowledge from the ShowMnemonic state".into(),
            });
        }
        self.state = BackupState::ConfirmMnemonic;
        Ok(())
    }

    /// Confirms the ceremony by comparing re-entered words against the
    /// stored phrase, whitespace-insensitively.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::AuthError`] unless currently in
    ///   `ConfirmMnemonic`.
    /// - [`ParallelError::InvalidMnemonic`] when the words differ.
    pub fn confirm(&mut self, words: &str) -> Result<()> {
        if self.state != BackupState::ConfirmMnemonic {
            return Err(ParallelError::AuthError {
                reason: "can only confirm from the ConfirmMnemonic state".into(),
            });
        }

        let entered: Vec<&str> = words.split_whitespace().collect();
        let stored: Vec<&str> = self.phrase.split_whitespace().collect();
        if entered != stored {
            return Err(ParallelError::InvalidMnemonic {
                reason: "confirmation words do not match the recovery phrase".into(),
            });
        }

        self.phrase.zeroize();
        self.state = BackupState::Complete;
        Ok(())
    }

    /// Whether the ceremony finished successfully.
    pub fn is_complete(&self) -> bool {
        self.state == BackupState::Complete
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Starts a backup ceremony for the stored wallet.
///
/// The PIN gates the reveal; the returned flow starts in
/// [`BackupState::ShowMnemonic`].
///
/// # Errors
///
/// - [`ParallelError::AuthError`] when the PIN does not match.
/// - [`ParallelError::SigningError`] when no mnemonic is stored.
pub fn export_backup(manager: &WalletManager<'_>, pin: &Pin) -> Result<BackupFlow> {
    let mnemonic = manager.reveal_mnemonic(pin)?;
    Ok(BackupFlow {
        state: BackupState::ShowMnemonic,
        phrase: mnemonic.as_str().to_string(),
    })
}
