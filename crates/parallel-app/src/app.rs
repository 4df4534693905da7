//! The running application: one owner for every subsystem.
//!
//! [`App`] wires the encrypted store, chain gateway, indexer, and
//! governance client together and exposes the operations a frontend
//! calls. It is constructed once from [`AppConfig`] + [`ChainProfile`]
//! and passed by reference; nothing in here is a global.
//!
//! Lock rules: reads that only need an address (balances, history, fee
//! quotes, proposal lists) work while locked. Anything that signs, or
//! acts on the governance backend as the user, requires an unlocked
//! session, and the mutating governance calls additionally require a
//! sign-in token. Private keys are fetched from the store per signature
//! and dropped; the session never holds one.

use chrono::Utc;
use tracing::{debug, info};

use parallel_chain::{
    BalanceReader, Broadcaster, EstimateSequencer, FeeEstimator, FeeRequest, RpcClient,
    SendRequest, TransferScanner,
};
use parallel_crypto::Mnemonic;
use parallel_governance::{meets_proposal_threshold, GovernanceClient, ProposalDraft};
use parallel_history::{HistoryFilter, HistoryReconciler, IndexerClient};
use parallel_storage::StorageEngine;
use parallel_types::config::{AppConfig, ChainProfile};
use parallel_types::{
    Address, FeeEstimate, ParallelError, Proposal, ProposalUpdate, Result, TokenBalance,
    TokenKind, TxDirection, TxHash, TxRecord, TxStatus, UpdateStatus, VoteChoice, Wei,
};
use parallel_wallet::{Pin, WalletIdentity, WalletManager, WalletSession};

use crate::store_key;

/// File name of the sled database inside the data directory.
const STORE_FILE: &str = "store.db";

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// One running wallet application.
///
/// Owns the storage engine, the chain gateway, the history reconciler
/// inputs, the governance client (when configured), and the session.
pub struct App {
    config: AppConfig,
    profile: ChainProfile,
    engine: StorageEngine,
    rpc: RpcClient,
    indexer: IndexerClient,
    /// `None` when no governance backend is configured.
    governance: Option<GovernanceClient>,
    session: WalletSession,
    estimates: EstimateSequencer,
}

impl App {
    /// Opens the application against `config` and `profile`.
    ///
    /// The store passphrase is stretched through Argon2id (salted per
    /// data directory) into the storage master key; the first open
    /// creates the data directory and the salt. The session starts
    /// locked.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::ConfigError`] when either input fails
    ///   validation or the passphrase is blank.
    /// - [`ParallelError::StorageUnavailable`] when the data directory
    ///   or the database cannot be opened.
    pub fn open(config: AppConfig, profile: ChainProfile, passphrase: &str) -> Result<Self> {
        config.validate()?;
        profile.validate()?;

        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            ParallelError::StorageUnavailable {
                reason: format!("failed to create data directory: {e}"),
            }
        })?;

        let salt = store_key::load_or_create_salt(&config.data_dir)?;
        let master = store_key::stretch_passphrase(passphrase, &salt)?;
        let engine = StorageEngine::open(&config.data_dir.join(STORE_FILE), master.as_bytes())?;

        let rpc = RpcClient::from_profile(&profile, config.request_timeout_secs)?;
        let indexer = IndexerClient::from_profile(&profile, config.request_timeout_secs)?;
        let governance = if config.governance_url.trim().is_empty() {
            None
        } else {
            Some(GovernanceClient::new(
                &config.governance_url,
                config.request_timeout_secs,
            )?)
        };

        info!(
            data_dir = %config.data_dir.display(),
            chain_id = profile.chain_id,
            governance = governance.is_some(),
            "application opened"
        );

        Ok(Self {
            config,
            profile,
            engine,
            rpc,
            indexer,
            governance,
            session: WalletSession::new(),
            estimates: EstimateSequencer::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn profile(&self) -> &ChainProfile {
        &self.profile
    }

    /// Flushes the store. Call once before exit.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::StorageUnavailable`] if the flush fails.
    pub fn flush(&self) -> Result<()> {
        self.engine.flush()
    }

    // -----------------------------------------------------------------------
    // Wallet lifecycle
    // -----------------------------------------------------------------------

    /// Whether a private key is stored.
    pub fn wallet_exists(&self) -> Result<bool> {
        self.manager().wallet_exists()
    }

    /// Creates a fresh 24-word wallet and persists its credentials.
    ///
    /// The returned identity is the only chance to run the backup
    /// ceremony with the fresh mnemonic.
    pub fn create_wallet(&self) -> Result<WalletIdentity> {
        self.manager().create_wallet()
    }

    /// Imports a wallet from user-entered words and persists it.
    pub fn import_wallet(&self, words: &str) -> Result<WalletIdentity> {
        self.manager().import_wallet(words)
    }

    /// Stores the digest of a new PIN, replacing any previous one.
    pub fn set_pin(&self, pin: &Pin) -> Result<()> {
        self.manager().set_pin(pin)
    }

    /// Whether a PIN has been configured.
    pub fn has_pin(&self) -> Result<bool> {
        self.manager().has_pin()
    }

    /// Checks a PIN against the stored digest; unconfigured is `false`.
    pub fn verify_pin(&self, pin: &Pin) -> Result<bool> {
        self.manager().verify_pin(pin)
    }

    /// Returns the stored mnemonic after PIN verification.
    pub fn reveal_mnemonic(&self, pin: &Pin) -> Result<Mnemonic> {
        self.manager().reveal_mnemonic(pin)
    }

    /// Unlocks the session and returns the active address.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::AuthError`] when the PIN does not match.
    /// - [`ParallelError::SigningError`] when no wallet is stored.
    pub fn unlock(&mut self, pin: &Pin) -> Result<Address> {
        let manager = WalletManager::new(&self.engine);
        self.session.unlock(&manager, pin)?;
        self.unlocked_address()
    }

    /// Locks the session, dropping the pinned address and auth token.
    pub fn lock(&mut self) {
        self.session.lock();
    }

    /// Whether the session is unlocked.
    pub fn is_unlocked(&self) -> bool {
        self.session.is_unlocked()
    }

    /// Deletes all credentials, PIN, and pending records, and locks.
    pub fn clear_wallet(&mut self) -> Result<()> {
        self.session.lock();
        WalletManager::new(&self.engine).clear_wallet()
    }

    /// EIP-55 display form of the active address, if onboarding ever
    /// completed.
    pub fn address_display(&self) -> Result<Option<String>> {
        self.manager().active_address_display()
    }

    // -----------------------------------------------------------------------
    // Balances
    // -----------------------------------------------------------------------

    /// Loads the native and token balances concurrently.
    ///
    /// Works while locked. Either the config switch or the persisted
    /// settings flag routes reads to the mock source.
    pub async fn load_balances(&self) -> Result<(TokenBalance, TokenBalance)> {
        let address = self.account_address()?;
        self.balance_reader()?.all_balances(&address).await
    }

    /// The account's LUT balance, which is the voting power the backend
    /// snapshots.
    pub async fn voting_power(&self) -> Result<Wei> {
        let address = self.account_address()?;
        let balance = self.balance_reader()?.token_balance(&address).await?;
        Ok(balance.raw)
    }

    /// Persists the mock-balance switch.
    pub fn set_use_mock_balances(&self, enabled: bool) -> Result<()> {
        self.engine.settings()?.set_use_mock_balances(enabled)?;
        self.engine.flush()
    }

    // -----------------------------------------------------------------------
    // Fees and sending
    // -----------------------------------------------------------------------

    /// Quotes the fee for a candidate send from the active account.
    ///
    /// Every call starts a new estimation round. When rounds overlap,
    /// only the newest publishes; an overtaken quote returns `Ok(None)`
    /// so the caller drops it instead of displaying a stale figure.
    pub async fn estimate_send_fee(
        &self,
        token: TokenKind,
        to: Address,
        amount: Wei,
    ) -> Result<Option<FeeEstimate>> {
        let from = self.account_address()?;
        let round = self.estimates.begin();
        let estimate = FeeEstimator::new(&self.rpc, self.profile.lut_contract)
            .estimate(&FeeRequest {
                token,
                from,
                to,
                amount,
            })
            .await?;
        if !self.estimates.is_current(round) {
            debug!(round, "discarding overtaken fee estimate");
            return Ok(None);
        }
        Ok(Some(estimate))
    }

    /// Signs and broadcasts a send, then records the pending row.
    ///
    /// When `request` carries no gas parameters a fresh estimate fills
    /// them, so the recorded fee always matches what was signed. The
    /// broadcast happens exactly once; on failure nothing is recorded
    /// and the caller re-estimates and resubmits explicitly.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::AuthError`] while locked.
    /// - [`ParallelError::EstimationError`] when gas parameters were
    ///   absent and no estimate could be produced.
    /// - [`ParallelError::BroadcastError`] when the nonce read or the
    ///   submission fails.
    /// - [`ParallelError::StorageUnavailable`] when the broadcast went
    ///   out but the pending record could not be written.
    pub async fn send(&self, request: &SendRequest) -> Result<TxRecord> {
        let from = self.unlocked_address()?;

        let (gas_limit, gas_price) = match (request.gas_limit, request.gas_price) {
            (Some(limit), Some(price)) => (limit, price),
            _ => {
                let estimate = FeeEstimator::new(&self.rpc, self.profile.lut_contract)
                    .estimate(&FeeRequest {
                        token: request.token,
                        from,
                        to: request.to,
                        amount: request.amount,
                    })
                    .await?;
                (
                    request.gas_limit.unwrap_or(estimate.gas_limit),
                    request.gas_price.unwrap_or(estimate.gas_price),
                )
            }
        };
        let filled = SendRequest {
            token: request.token,
            to: request.to,
            amount: request.amount,
            gas_limit: Some(gas_limit),
            gas_price: Some(gas_price),
        };

        let key = self.manager().private_key()?;
        let hash = Broadcaster::new(&self.rpc, self.profile.chain_id, self.profile.lut_contract)
            .send_transaction(&key, &filled)
            .await?;

        let record = outgoing_record(
            hash,
            from,
            &filled,
            gas_limit,
            gas_price,
            Utc::now().timestamp_millis(),
        );
        self.reconciler()?.add_pending_record(&record)?;
        self.engine.flush()?;
        debug!(hash = %record.hash, "pending record stored");
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// The merged history view for the active account, newest first.
    ///
    /// Works while locked. Indexer failures degrade the view (transfer
    /// log scan, then pending records only) instead of failing it.
    pub async fn load_history(&self, filter: HistoryFilter) -> Result<Vec<TxRecord>> {
        let address = self.account_address()?;
        let records = self.reconciler()?.load_history(&address).await?;
        Ok(records
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    /// Signs in to the governance backend with the wallet key.
    ///
    /// The bearer token lives in the session and dies with the lock.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::ConfigError`] when no backend is configured.
    /// - [`ParallelError::AuthError`] while locked, or when the backend
    ///   rejects the sign-in.
    pub async fn sign_in(&mut self) -> Result<()> {
        self.unlocked_address()?;
        let key = WalletManager::new(&self.engine).private_key()?;
        let token = match &self.governance {
            Some(client) => client.sign_in(&key).await?,
            None => return Err(no_governance()),
        };
        self.session.set_auth_token(token)
    }

    /// Whether a sign-in token is held this session.
    pub fn signed_in(&self) -> bool {
        self.session.auth_token().is_some()
    }

    /// The proposal list (world-readable).
    pub async fn proposals(&self) -> Result<Vec<Proposal>> {
        self.governance()?.proposals().await
    }

    /// One proposal; the caller's own ballot rides along when signed in.
    pub async fn proposal(&self, id: &str) -> Result<Proposal> {
        self.governance()?
            .proposal(id, self.session.auth_token())
            .await
    }

    /// Submits a new proposal.
    ///
    /// The snapshot is the current block number, the same height the
    /// backend weighs votes at. Submission is refused up front when the
    /// account's LUT balance is below the proposal threshold.
    ///
    /// # Errors
    ///
    /// - [`ParallelError::ConfigError`] for a malformed draft or a
    ///   missing backend.
    /// - [`ParallelError::AuthError`] without a sign-in token.
    /// - [`ParallelError::BroadcastError`] when the account is below the
    ///   threshold or the backend rejects the submission.
    /// - [`ParallelError::RpcError`] when the snapshot block cannot be
    ///   read.
    pub async fn create_proposal(&self, draft: &ProposalDraft) -> Result<Proposal> {
        let governance = self.governance()?;
        let token = self.auth_token()?;
        draft.validate()?;

        let power = self.voting_power().await?;
        if !meets_proposal_threshold(power) {
            return Err(ParallelError::BroadcastError {
                reason: format!(
                    "createProposal: voting power {} LUT is below the proposal threshold",
                    power.format_units(TokenKind::Lut.decimals()),
                ),
            });
        }

        let snapshot_block = self.rpc.block_number().await?;
        let key = self.manager().private_key()?;
        governance
            .create_proposal(token, &key, draft, snapshot_block)
            .await
    }

    /// Deletes a proposal the signed-in account authored.
    pub async fn delete_proposal(&self, id: &str) -> Result<()> {
        let governance = self.governance()?;
        let token = self.auth_token()?;
        governance.delete_proposal(token, id).await
    }

    /// Casts a FOR/AGAINST ballot on an open proposal.
    ///
    /// The proposal is fetched first: its status gates the vote and its
    /// snapshot block rides in the signed message (zero when the backend
    /// never recorded one).
    pub async fn cast_vote(&self, proposal_id: &str, choice: VoteChoice) -> Result<()> {
        let governance = self.governance()?;
        let token = self.auth_token()?;

        let proposal = governance.proposal(proposal_id, Some(token)).await?;
        if !proposal.status.accepts_votes() {
            return Err(ParallelError::BroadcastError {
                reason: format!(
                    "vote: proposal is {} and not accepting votes",
                    proposal.status
                ),
            });
        }

        let key = self.manager().private_key()?;
        governance
            .cast_vote(
                token,
                &key,
                proposal_id,
                choice,
                proposal.snapshot_block.unwrap_or(0),
            )
            .await
    }

    /// Updates posted under a proposal, newest first.
    pub async fn proposal_updates(&self, proposal_id: &str) -> Result<Vec<ProposalUpdate>> {
        self.governance()?
            .updates(proposal_id, self.session.auth_token())
            .await
    }

    /// Posts a progress update under a proposal.
    pub async fn add_proposal_update(
        &self,
        proposal_id: &str,
        status: UpdateStatus,
        content: &str,
    ) -> Result<ProposalUpdate> {
        let governance = self.governance()?;
        let token = self.auth_token()?;
        governance.add_update(token, proposal_id, status, content).await
    }

    /// Rewrites an existing progress update.
    pub async fn edit_proposal_update(
        &self,
        id: &str,
        status: UpdateStatus,
        content: &str,
    ) -> Result<ProposalUpdate> {
        let governance = self.governance()?;
        let token = self.auth_token()?;
        governance.edit_update(token, id, status, content).await
    }

    /// Deletes a progress update.
    pub async fn delete_proposal_update(&self, id: &str) -> Result<()> {
        let governance = self.governance()?;
        let token = self.auth_token()?;
        governance.delete_update(token, id).await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn manager(&self) -> WalletManager<'_> {
        WalletManager::new(&self.engine)
    }

    fn governance(&self) -> Result<&GovernanceClient> {
        self.governance.as_ref().ok_or_else(no_governance)
    }

    fn balance_reader(&self) -> Result<BalanceReader<'_>> {
        let use_mock =
            self.config.use_mock_balances || self.engine.settings()?.use_mock_balances()?;
        Ok(BalanceReader::new(
            &self.rpc,
            self.profile.lut_contract,
            use_mock,
        ))
    }

    fn reconciler(&self) -> Result<HistoryReconciler<'_>> {
        Ok(HistoryReconciler::new(
            &self.indexer,
            self.engine.pending_txs()?,
            Some(TransferScanner::new(&self.rpc, self.profile.lut_contract)),
        ))
    }

    /// The session address; signing paths refuse to run locked.
    fn unlocked_address(&self) -> Result<Address> {
        self.session.address().ok_or_else(|| ParallelError::AuthError {
            reason: "wallet is locked; unlock with the PIN first".into(),
        })
    }

    /// The session token; mutating governance calls refuse to run
    /// without one.
    fn auth_token(&self) -> Result<&str> {
        self.session.auth_token().ok_or_else(|| ParallelError::AuthError {
            reason: "not signed in to the governance backend".into(),
        })
    }

    /// Address for read paths that work while locked: the session
    /// address when unlocked, the stored active address otherwise.
    fn account_address(&self) -> Result<Address> {
        if let Some(address) = self.session.address() {
            return Ok(address);
        }
        self.manager()
            .active_address()?
            .ok_or_else(|| ParallelError::ConfigError {
                reason: "no wallet stored; create or import one first".into(),
            })
    }
}

// ---------------------------------------------------------------------------
// Pending record synthesis
// ---------------------------------------------------------------------------

/// The locally-synthesized row for a just-broadcast send.
fn outgoing_record(
    hash: TxHash,
    from: Address,
    request: &SendRequest,
    gas_limit: u64,
    gas_price: Wei,
    timestamp_ms: i64,
) -> TxRecord {
    TxRecord {
        hash,
        token: request.token,
        direction: TxDirection::Outgoing,
        title: format!("Sent {}", request.token),
        from,
        to: request.to,
        amount: request.amount.format_units(request.token.decimals()),
        raw_amount: request.amount,
        timestamp_ms,
        status: TxStatus::Pending,
        fee: gas_price.checked_mul_gas(gas_limit),
        usd_value: None,
    }
}

fn no_governance() -> ParallelError {
    ParallelError::ConfigError {
        reason: "no governance backend configured; set governance_url first".into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SendRequest {
        SendRequest {
            token: TokenKind::Lut,
            to: Address::new([0xBB; 20]),
            amount: Wei::new(25_500_000_000_000_000_000),
            gas_limit: Some(110_000),
            gas_price: Some(Wei::new(60_000_000)),
        }
    }

    #[test]
    fn pending_record_is_an_outgoing_pending_row() {
        let record = outgoing_record(
            TxHash::new([0x11; 32]),
            Address::new([0xAA; 20]),
            &request(),
            110_000,
            Wei::new(60_000_000),
            1_700_000_000_000,
        );

        assert_eq!(record.direction, TxDirection::Outgoing);
        assert_eq!(record.status, TxStatus::Pending);
        assert_eq!(record.title, "Sent LUT");
        assert_eq!(record.from, Address::new([0xAA; 20]));
        assert_eq!(record.to, Address::new([0xBB; 20]));
        assert_eq!(record.timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn pending_record_formats_the_amount_at_token_decimals() {
        let record = outgoing_record(
            TxHash::new([0x11; 32]),
            Address::new([0xAA; 20]),
            &request(),
            110_000,
            Wei::new(60_000_000),
            0,
        );

        assert_eq!(record.amount, "25.50");
        assert_eq!(record.raw_amount, Wei::new(25_500_000_000_000_000_000));
    }

    #[test]
    fn pending_record_fee_is_the_signed_gas_product() {
        let record = outgoing_record(
            TxHash::new([0x11; 32]),
            Address::new([0xAA; 20]),
            &request(),
            110_000,
            Wei::new(60_000_000),
            0,
        );

        assert_eq!(record.fee, Some(Wei::new(110_000 * 60_000_000)));
    }

    #[test]
    fn native_sends_are_titled_by_symbol() {
        let request = SendRequest {
            token: TokenKind::Rbtc,
            ..request()
        };
        let record = outgoing_record(
            TxHash::new([0x22; 32]),
            Address::new([0xAA; 20]),
            &request,
            23_100,
            Wei::new(60_000_000),
            0,
        );

        assert_eq!(record.title, "Sent RBTC");
    }
}
