//! Multi-signature spending proposals
//!
//! A proposal collects approvals and rejections from co-signers against
//! configured quorum thresholds, then hands the accumulated signatures to
//! the transaction assembler.
//!
//! # Example
//!
//! ```ignore
//! use txproposal::proposal::{ProposalParams, TxProposal};
//!
//! // Propose a spend from a 2-of-3 wallet
//! let mut txp = TxProposal::create(params)?;
//!
//! // Collect signer decisions
//! txp.sign("copayer-1", signatures_1, Some(xpub_1))?;
//! txp.sign("copayer-2", signatures_2, Some(xpub_2))?;
//! assert!(txp.is_accepted());
//!
//! // Hand the partially signed transaction to the broadcaster
//! let hex = txp.raw_tx()?;
//! ```

pub mod action;
pub mod txproposal;

pub use action::{Action, ActionKind};
pub use txproposal::{
    ChangeAddress, Input, Output, ProposalError, ProposalParams, ProposalStatus, TxProposal,
    PROPOSAL_VERSION,
};
