//! Proposal drafting: submission rules and typed-message assembly.
//!
//! A draft is one explicit shape with named fields; the voting close time
//! is the only optional part. [`ProposalDraft::build_message`] validates
//! the draft and produces the exact typed message the author signs, so a
//! draft that assembles is a draft the backend can verify.

use parallel_protocol::eip712::ProposalMessage;
use parallel_types::{
    Address, ParallelError, Result, VoteChoice, Wei, PROPOSAL_CATEGORIES,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Governance space bound into every proposal signature.
pub const PROPOSAL_SPACE: &str = "parallel";

/// Voting system identifier, the only kind the backend tallies.
pub const PROPOSAL_KIND: &str = "single-choice";

/// Application tag submitted with every proposal.
pub const PROPOSAL_APP: &str = "parallel";

/// Plugin configuration, always the empty object.
const PROPOSAL_PLUGINS: &str = "{}";

/// Voting window applied when a draft does not override the close time.
pub const DEFAULT_VOTING_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Minimum LUT balance required to create a proposal: 2000 whole tokens.
pub const MIN_PROPOSAL_LUT: Wei = Wei::new(2_000_000_000_000_000_000_000);

/// Whether `balance` clears the proposal-creation threshold.
pub fn meets_proposal_threshold(balance: Wei) -> bool {
    balance >= MIN_PROPOSAL_LUT
}

// ---------------------------------------------------------------------------
// ProposalDraft
// ---------------------------------------------------------------------------

/// A proposal as the author fills it in, before signing.
#[derive(Clone, Debug)]
pub struct ProposalDraft {
    pub title: String,
    /// One of [`PROPOSAL_CATEGORIES`].
    pub category: String,
    /// Markdown body shown on the proposal page.
    pub body: String,
    /// Link to an off-platform discussion thread, empty when none exists.
    pub discussion: String,
    /// Voting close override, unix seconds.
    pub end: Option<u64>,
}

impl ProposalDraft {
    /// Creates a draft with no discussion link and the default window.
    pub fn new(title: &str, category: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            category: category.to_string(),
            body: body.to_string(),
            discussion: String::new(),
            end: None,
        }
    }

    /// Checks the draft against the submission rules.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] for a blank title or body,
    /// or a category outside [`PROPOSAL_CATEGORIES`].
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(invalid_draft("proposal title must not be empty"));
        }
        if self.body.trim().is_empty() {
            return Err(invalid_draft("proposal body must not be empty"));
        }
        if !PROPOSAL_CATEGORIES.contains(&self.category.as_str()) {
            return Err(invalid_draft(&format!(
                "unknown proposal category '{}' (expected one of {})",
                self.category,
                PROPOSAL_CATEGORIES.join(", ")
            )));
        }
        Ok(())
    }

    /// Assembles the typed message for signing.
    ///
    /// The voting window opens at `now` and closes at the draft override
    /// or [`DEFAULT_VOTING_WINDOW_SECS`] later; `snapshot_block` fixes the
    /// voting-power reference.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::ConfigError`] when the draft fails
    /// [`ProposalDraft::validate`] or the close time does not lie after
    /// `now`.
    pub fn build_message(
        &self,
        author: Address,
        now: u64,
        snapshot_block: u64,
    ) -> Result<ProposalMessage> {
        self.validate()?;
        let end = self
            .end
            .unwrap_or_else(|| now.saturating_add(DEFAULT_VOTING_WINDOW_SECS));
        if end <= now {
            return Err(invalid_draft("voting close time must lie in the future"));
        }
        Ok(ProposalMessage {
            from: author,
            space: PROPOSAL_SPACE.to_string(),
            timestamp: now,
            kind: PROPOSAL_KIND.to_string(),
            title: self.title.clone(),
            body: self.body.clone(),
            discussion: self.discussion.clone(),
            choices: vec![
                VoteChoice::For.as_str().to_string(),
                VoteChoice::Against.as_str().to_string(),
            ],
            start: now,
            end,
            snapshot: snapshot_block,
            plugins: PROPOSAL_PLUGINS.to_string(),
            app: PROPOSAL_APP.to_string(),
        })
    }
}

fn invalid_draft(reason: &str) -> ParallelError {
    ParallelError::ConfigError {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
