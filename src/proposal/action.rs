//! Signer action ledger entries
//!
//! Each co-signer gets at most one entry: an approval carrying one
//! signature per input, or a rejection. Entries are append-only; the
//! proposal's status is always derived from the full ledger.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The kind of action a signer took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Approve,
    Reject,
}

/// One signer's recorded decision on a proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Identity of the signer (one action per identity)
    pub signer_id: String,
    pub kind: ActionKind,
    /// Hex DER signatures, one per input, in input order (approvals only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<String>,
    /// The signer's extended public key, recorded so downstream validators
    /// can tie the signatures to the input public keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpub: Option<String>,
    pub created_on: i64,
}

impl Action {
    /// Record an approval with its per-input signatures
    pub fn approve(signer_id: &str, signatures: Vec<String>, xpub: Option<String>) -> Self {
        Self {
            signer_id: signer_id.to_string(),
            kind: ActionKind::Approve,
            signatures,
            xpub,
            created_on: Utc::now().timestamp(),
        }
    }

    /// Record a rejection
    pub fn reject(signer_id: &str) -> Self {
        Self {
            signer_id: signer_id.to_string(),
            kind: ActionKind::Reject,
            signatures: Vec::new(),
            xpub: None,
            created_on: Utc::now().timestamp(),
        }
    }

    pub fn is_approval(&self) -> bool {
        self.kind == ActionKind::Approve
    }

    pub fn is_rejection(&self) -> bool {
        self.kind == ActionKind::Reject
    }
}
