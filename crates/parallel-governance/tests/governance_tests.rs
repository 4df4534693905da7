//! Failure-path tests against an unroutable backend.
//!
//! Signing and draft validation happen before any request leaves the
//! process, so a dead endpoint separates local failures from transport
//! failures: a local problem must surface as its own error kind, never
//! as a network error.

use parallel_crypto::signing::PrivateKey;
use parallel_governance::{GovernanceClient, ProposalDraft};
use parallel_types::{ParallelError, UpdateStatus, VoteChoice};

/// Nothing listens on port 1, so requests are refused immediately.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

fn dead_client() -> GovernanceClient {
    GovernanceClient::new(DEAD_ENDPOINT, 1).unwrap()
}

fn signer() -> PrivateKey {
    PrivateKey::from_hex("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
        .unwrap()
}

#[tokio::test]
async fn sign_in_failures_are_auth_errors() {
    let err = dead_client().sign_in(&signer()).await.unwrap_err();
    match err {
        ParallelError::AuthError { reason } => {
            assert!(reason.contains("authRequestNonce"), "reason: {reason}");
        }
        other => panic!("expected AuthError, got {other}"),
    }
}

#[tokio::test]
async fn proposal_reads_are_rpc_errors() {
    let err = dead_client().proposals().await.unwrap_err();
    match err {
        ParallelError::RpcError { reason } => {
            assert!(reason.contains("listProposals"), "reason: {reason}");
        }
        other => panic!("expected RpcError, got {other}"),
    }

    let err = dead_client()
        .updates("p1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ParallelError::RpcError { .. }));
}

#[tokio::test]
async fn vote_submission_failures_are_broadcast_errors() {
    // Signing succeeds locally; only the relay fails.
    let err = dead_client()
        .cast_vote("token", &signer(), "p1", VoteChoice::For, 6_400_000)
        .await
        .unwrap_err();
    match err {
        ParallelError::BroadcastError { reason } => {
            assert!(reason.contains("vote"), "reason: {reason}");
        }
        other => panic!("expected BroadcastError, got {other}"),
    }
}

#[tokio::test]
async fn proposal_submission_failures_are_broadcast_errors() {
    let draft = ProposalDraft::new("Fund the relay", "Finance", "Allocate funds for Q4.");
    let err = dead_client()
        .create_proposal("token", &signer(), &draft, 6_400_000)
        .await
        .unwrap_err();
    assert!(matches!(err, ParallelError::BroadcastError { .. }));
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_network() {
    let draft = ProposalDraft::new("Fund the relay", "Parties", "body");
    let err = dead_client()
        .create_proposal("token", &signer(), &draft, 6_400_000)
        .await
        .unwrap_err();
    // A draft failure is a local validation error, not a transport one.
    assert!(matches!(err, ParallelError::ConfigError { .. }));
}

#[tokio::test]
async fn update_mutations_are_broadcast_errors() {
    let err = dead_client()
        .add_update("token", "p1", UpdateStatus::InProgress, "Deployed to testnet.")
        .await
        .unwrap_err();
    match err {
        ParallelError::BroadcastError { reason } => {
            assert!(reason.contains("addProposalUpdate"), "reason: {reason}");
        }
        other => panic!("expected BroadcastError, got {other}"),
    }

    let err = dead_client()
        .delete_update("token", "u1")
        .await
        .unwrap_err();
    assert!(matches!(err, ParallelError::BroadcastError { .. }));
}
