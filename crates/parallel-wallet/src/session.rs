//! In-memory session state: lock/unlock plus the backend auth token.
//!
//! The session never holds key material. Unlocking only proves the PIN
//! and pins the active address; signing operations fetch the private
//! key from the store per call.

use parallel_types::{Address, ParallelError, Result};

use crate::manager::WalletManager;
use crate::pin::Pin;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lock state of the running application.
pub enum SessionState {
    /// No verified user; wallet operations are unavailable.
    Locked,
    /// PIN verified; the active address is pinned.
    Unlocked(UnlockedSession),
}

/// Session data available only after PIN verification.
pub struct UnlockedSession {
    address: Address,
    /// Bearer token from backend sign-in, once acquired.
    auth_token: Option<String>,
}

// ---------------------------------------------------------------------------
// WalletSession
// ---------------------------------------------------------------------------

/// Lock/unlock lifecycle for one running app.
///
/// Starts locked. [`unlock`](WalletSession::unlock) verifies the PIN
/// against the store and pins the active address; [`lock`] drops the
/// address and any auth token.
///
/// [`lock`]: WalletSession::lock
pub struct WalletSession {
    state: SessionState,
}

impl WalletSession {
    /// A fresh locked session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Locked,
        }
    }

    /// Whether the session is unlocked.
    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, SessionState::Unlocked(_))
    }

    /// The active address while unlocked.
    pub fn address(&self) -> Option<Address> {
        match &self.state {
            SessionState::Unlocked(unlocked) => Some(unlocked.address),
            SessionState::Locked => None,
        }
    }

    /// The backend bearer token, if sign-in happened this session.
    pub fn auth_token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Unlocked(unlocked) => unlocked.auth_token.as_deref(),
            SessionState::Locked => None,
        }
    }

    /// Unlocks by verifying the PIN and loading the active address.
    ///
    /// Idempotent: unlocking an unlocked session is a no-op.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::AuthError`] when the PIN does not match.
    /// - [`ParallelError::SigningError`] when no wallet is stored.
    pub fn unlock(&mut self, manager: &WalletManager<'_>, pin: &Pin) -> Result<()> {
        if self.is_unlocked() {
            return Ok(());
        }
        if !manager.verify_pin(pin)? {
            return Err(ParallelError::AuthError {
                reason: "PIN verification failed".into(),
            });
        }
        let address = manager
            .active_address()?
            .ok_or_else(|| ParallelError::SigningError {
                reason: "no wallet stored; create or import one first".into(),
            })?;
        self.state = SessionState::Unlocked(UnlockedSession {
            address,
            auth_token: None,
        });
        Ok(())
    }

    /// Locks the session, dropping the address and auth token.
    ///
    /// Idempotent.
    pub fn lock(&mut self) {
        self.state = SessionState::Locked;
    }

    /// Stores the bearer token after backend sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::AuthError`] while locked.
    pub fn set_auth_token(&mut self, token: String) -> Result<()> {
        match &mut self.state {
            SessionState::Unlocked(unlocked) => {
                unlocked.auth_token = Some(token);
                Ok(())
            }
            SessionState::Locked => Err(ParallelError::AuthError {
                reason: "cannot store an auth token while locked".into(),
            }),
        }
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}
