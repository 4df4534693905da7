//! HTTP client for the governance backend.
//!
//! The backend exposes one function per endpoint: proposal listing and
//! fetch are open reads, everything that writes carries a bearer token
//! from the wallet-signature sign-in flow. Read failures map to
//! [`ParallelError::RpcError`] and submissions to
//! [`ParallelError::BroadcastError`], in both cases preserving the
//! backend's own failure message; the sign-in flow maps to
//! [`ParallelError::AuthError`]. Submissions are one-shot: nothing here
//! retries, a failed vote must fail loudly.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use parallel_crypto::signing::{personal_sign, PrivateKey};
use parallel_protocol::eip712::VoteMessage;
use parallel_types::{
    Address, ParallelError, Proposal, ProposalUpdate, Result, UpdateStatus, VoteChoice,
};

use crate::draft::ProposalDraft;

/// Statement the user signs (EIP-191) to bind a session nonce.
pub fn sign_in_message(nonce: &str) -> String {
    format!("Sign in to Parallel Society Governance\nNonce: {nonce}")
}

#[derive(Deserialize)]
struct NonceResponse {
    nonce: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

// ---------------------------------------------------------------------------
// GovernanceClient
// ---------------------------------------------------------------------------

/// HTTP client for one governance backend base URL.
///
/// The client holds no session state; callers pass the bearer token that
/// [`GovernanceClient::sign_in`] returned.
pub struct GovernanceClient {
    http: reqwest::Client,
    base_url: String,
}

impl GovernanceClient {
    /// Builds a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] when the URL is empty or
    /// the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ParallelError::ConfigError {
                reason: "governance client needs a base URL".into(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ParallelError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Sign-in
    // -----------------------------------------------------------------------

    /// Requests a fresh sign-in nonce for `address`
    /// (`POST /authRequestNonce`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::AuthError`] on any transport, HTTP, or
    /// response-shape failure.
    pub async fn request_nonce(&self, address: &Address) -> Result<String> {
        let body = json!({ "address": address.to_string() });
        let value = self
            .call(reqwest::Method::POST, "authRequestNonce", &[], None, Some(&body))
            .await
            .map_err(|detail| auth_error("authRequestNonce", &detail))?;
        let response: NonceResponse = serde_json::from_value(value).map_err(|e| {
            auth_error("authRequestNonce", &format!("unexpected response shape: {e}"))
        })?;
        Ok(response.nonce)
    }

    /// Exchanges a signed nonce statement for a session token
    /// (`POST /authVerify`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::AuthError`] when the backend rejects the
    /// signature or the exchange fails in transit.
    pub async fn verify_signature(&self, address: &Address, signature: &str) -> Result<String> {
        let body = json!({
            "address": address.to_string(),
            "signature": signature,
        });
        let value = self
            .call(reqwest::Method::POST, "authVerify", &[], None, Some(&body))
            .await
            .map_err(|detail| auth_error("authVerify", &detail))?;
        let response: TokenResponse = serde_json::from_value(value)
            .map_err(|e| auth_error("authVerify", &format!("unexpected response shape: {e}")))?;
        Ok(response.token)
    }

    /// Runs the full sign-in flow: nonce, EIP-191 signature, token.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::SigningError`] if the key cannot sign and
    /// [`ParallelError::AuthError`] for every backend-side failure.
    pub async fn sign_in(&self, key: &PrivateKey) -> Result<String> {
        let address = key.address()?;
        let nonce = self.request_nonce(&address).await?;
        let signature = personal_sign(key, sign_in_message(&nonce).as_bytes())?;
        let token = self.verify_signature(&address, &signature).await?;
        info!(address = %address, "signed in to governance backend");
        Ok(token)
    }

    // -----------------------------------------------------------------------
    // Proposals
    // -----------------------------------------------------------------------

    /// All proposals, newest first as the backend orders them
    /// (`GET /listProposals`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::RpcError`] on any fetch failure.
    pub async fn proposals(&self) -> Result<Vec<Proposal>> {
        let value = self
            .call(reqwest::Method::GET, "listProposals", &[], None, None)
            .await
            .map_err(|detail| read_error("listProposals", &detail))?;
        serde_json::from_value(value)
            .map_err(|e| read_error("listProposals", &format!("unexpected response shape: {e}")))
    }

    /// One proposal by id (`GET /getProposal`). With a token the backend
    /// adds the caller's ballot and voting power.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::RpcError`] on any fetch failure.
    pub async fn proposal(&self, id: &str, token: Option<&str>) -> Result<Proposal> {
        let value = self
            .call(reqwest::Method::GET, "getProposal", &[("id", id)], token, None)
            .await
            .map_err(|detail| read_error("getProposal", &detail))?;
        serde_json::from_value(value)
            .map_err(|e| read_error("getProposal", &format!("unexpected response shape: {e}")))
    }

    /// Signs a draft and submits it (`POST /createProposal`).
    ///
    /// The snapshot block should be the current chain head; the caller is
    /// expected to have checked [`crate::meets_proposal_threshold`]
    /// against its LUT balance first, since the backend enforces the same
    /// gate.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] for an invalid draft,
    /// [`ParallelError::SigningError`] if signing fails, and
    /// [`ParallelError::BroadcastError`] when the backend rejects the
    /// submission.
    pub async fn create_proposal(
        &self,
        token: &str,
        key: &PrivateKey,
        draft: &ProposalDraft,
        snapshot_block: u64,
    ) -> Result<Proposal> {
        let author = key.address()?;
        let message = draft.build_message(author, unix_now(), snapshot_block)?;
        let signature = message.sign(key)?;
        let hash = format!("0x{}", hex::encode(message.signing_digest()));
        let body = json!({
            "message": {
                "from": message.from.to_string(),
                "space": message.space,
                "timestamp": message.timestamp,
                "type": message.kind,
                "title": message.title,
                "body": message.body,
                "discussion": message.discussion,
                "choices": message.choices,
                "start": message.start,
                "end": message.end,
                "snapshot": message.snapshot,
                "plugins": message.plugins,
                "app": message.app,
            },
            "signature": signature,
            "hash": hash,
        });
        let value = self
            .call(reqwest::Method::POST, "createProposal", &[], Some(token), Some(&body))
            .await
            .map_err(|detail| submit_error("createProposal", &detail))?;
        let created: Proposal = serde_json::from_value(value).map_err(|e| {
            submit_error("createProposal", &format!("unexpected response shape: {e}"))
        })?;
        debug!(proposal = %created.id, title = %created.title, "proposal created");
        Ok(created)
    }

    /// Removes a proposal the caller authored (`DELETE /deleteProposal`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::BroadcastError`] when the backend refuses.
    pub async fn delete_proposal(&self, token: &str, id: &str) -> Result<()> {
        self.call(
            reqwest::Method::DELETE,
            "deleteProposal",
            &[("id", id)],
            Some(token),
            None,
        )
        .await
        .map_err(|detail| submit_error("deleteProposal", &detail))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Votes
    // -----------------------------------------------------------------------

    /// Signs and submits a ballot (`POST /vote`).
    ///
    /// The vote binds the proposal's snapshot block and the current unix
    /// time; the backend recomputes the digest, verifies the signature,
    /// and applies voting weight. Weight is never computed locally.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::SigningError`] if signing fails and
    /// [`ParallelError::BroadcastError`] when the backend rejects the
    /// ballot.
    pub async fn cast_vote(
        &self,
        token: &str,
        key: &PrivateKey,
        proposal_id: &str,
        choice: VoteChoice,
        snapshot_block: u64,
    ) -> Result<()> {
        let voter = key.address()?;
        let timestamp = unix_now();
        let message = VoteMessage {
            proposal_id: proposal_id.to_string(),
            voter,
            choice: choice.as_str().to_string(),
            snapshot_block,
            timestamp,
        };
        let signature = message.sign(key)?;
        let body = json!({
            "proposalId": proposal_id,
            "voter": voter.to_string(),
            "choice": choice.as_str(),
            "signature": signature,
            "timestamp": timestamp,
        });
        self.call(reqwest::Method::POST, "vote", &[], Some(token), Some(&body))
            .await
            .map_err(|detail| submit_error("vote", &detail))?;
        debug!(proposal = proposal_id, choice = %choice, "vote submitted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Proposal updates
    // -----------------------------------------------------------------------

    /// Progress notes for a proposal, newest first
    /// (`GET /getProposalUpdates`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::RpcError`] on any fetch failure.
    pub async fn updates(
        &self,
        proposal_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<ProposalUpdate>> {
        let value = self
            .call(
                reqwest::Method::GET,
                "getProposalUpdates",
                &[("proposalId", proposal_id)],
                token,
                None,
            )
            .await
            .map_err(|detail| read_error("getProposalUpdates", &detail))?;
        let mut updates: Vec<ProposalUpdate> = serde_json::from_value(value).map_err(|e| {
            read_error("getProposalUpdates", &format!("unexpected response shape: {e}"))
        })?;
        updates.sort_by_key(|update| std::cmp::Reverse(update.created_at.unwrap_or(0)));
        Ok(updates)
    }

    /// Posts a progress note (`POST /addProposalUpdate`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::BroadcastError`] when the backend refuses.
    pub async fn add_update(
        &self,
        token: &str,
        proposal_id: &str,
        status: UpdateStatus,
        content: &str,
    ) -> Result<ProposalUpdate> {
        let body = json!({
            "proposalId": proposal_id,
            "status": status,
            "content": content,
        });
        let value = self
            .call(reqwest::Method::POST, "addProposalUpdate", &[], Some(token), Some(&body))
            .await
            .map_err(|detail| submit_error("addProposalUpdate", &detail))?;
        serde_json::from_value(value).map_err(|e| {
            submit_error("addProposalUpdate", &format!("unexpected response shape: {e}"))
        })
    }

    /// Rewrites an existing note's status and content
    /// (`PUT /editProposalUpdate`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::BroadcastError`] when the backend refuses.
    pub async fn edit_update(
        &self,
        token: &str,
        id: &str,
        status: UpdateStatus,
        content: &str,
    ) -> Result<ProposalUpdate> {
        let body = json!({
            "status": status,
            "content": content,
        });
        let value = self
            .call(
                reqwest::Method::PUT,
                "editProposalUpdate",
                &[("id", id)],
                Some(token),
                Some(&body),
            )
            .await
            .map_err(|detail| submit_error("editProposalUpdate", &detail))?;
        serde_json::from_value(value).map_err(|e| {
            submit_error("editProposalUpdate", &format!("unexpected response shape: {e}"))
        })
    }

    /// Removes a progress note (`DELETE /deleteProposalUpdate`).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::BroadcastError`] when the backend refuses.
    pub async fn delete_update(&self, token: &str, id: &str) -> Result<()> {
        self.call(
            reqwest::Method::DELETE,
            "deleteProposalUpdate",
            &[("id", id)],
            Some(token),
            None,
        )
        .await
        .map_err(|detail| submit_error("deleteProposalUpdate", &detail))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Runs one request and returns the body as JSON, or the failure
    /// detail for the caller to classify.
    async fn call(
        &self,
        method: reqwest::Method,
        action: &str,
        query: &[(&str, &str)],
        token: Option<&str>,
        body: Option<&Value>,
    ) -> std::result::Result<Value, String> {
        let mut request = self
            .http
            .request(method, format!("{}/{}", self.base_url, action))
            .query(query);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("transport failure: {e}"))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("unreadable response: {e}"))?;

        if !status.is_success() {
            return Err(match backend_message(&text) {
                Some(message) => format!("HTTP {status}: {message}"),
                None => format!("HTTP {status}"),
            });
        }
        if text.is_empty() {
            // Delete endpoints answer with an empty body.
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| format!("unparseable response: {e}"))
    }
}

/// Pulls the human-readable failure out of an error body. The backend
/// wraps failures as `{"message": …}` or `{"error": …}`; anything else
/// falls back to the raw text.
fn backend_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return Some(text.to_string());
            }
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn auth_error(action: &str, detail: &str) -> ParallelError {
    ParallelError::AuthError {
        reason: format!("{action}: {detail}"),
    }
}

fn read_error(action: &str, detail: &str) -> ParallelError {
    ParallelError::RpcError {
        reason: format!("{action}: {detail}"),
    }
}

fn submit_error(action: &str, detail: &str) -> ParallelError {
    ParallelError::BroadcastError {
        reason: format!("{action}: {detail}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_statement_embeds_the_nonce() {
        assert_eq!(
            sign_in_message("abc123"),
            "Sign in to Parallel Society Governance\nNonce: abc123"
        );
    }

    #[test]
    fn backend_messages_prefer_structured_fields() {
        assert_eq!(
            backend_message(r#"{"message":"Already voted"}"#).as_deref(),
            Some("Already voted")
        );
        assert_eq!(
            backend_message(r#"{"error":"invalid signature"}"#).as_deref(),
            Some("invalid signature")
        );
        assert_eq!(
            backend_message("upstream timeout").as_deref(),
            Some("upstream timeout")
        );
    }

    #[test]
    fn blank_error_bodies_yield_nothing() {
        assert_eq!(backend_message(""), None);
        assert_eq!(backend_message("   \n"), None);
    }

    #[test]
    fn non_string_fields_fall_back_to_raw_text() {
        assert_eq!(
            backend_message(r#"{"message":42}"#).as_deref(),
            Some(r#"{"message":42}"#)
        );
    }

    #[test]
    fn base_urls_are_normalized() -> Result<()> {
        let client = GovernanceClient::new(" https://gov.example.org/ ", 10)?;
        assert_eq!(client.base_url(), "https://gov.example.org");
        Ok(())
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(GovernanceClient::new("  ", 10).is_err());
        assert!(GovernanceClient::new("/", 10).is_err());
    }
}
