//! Multi-signature transaction proposal engine
//!
//! This crate provides the core lifecycle of a multi-signer spending
//! proposal:
//! - Quorum state machine collecting per-signer approvals and rejections
//! - Append-only action ledger (one action per signer identity)
//! - CSPRNG-permuted output ordering that hides the change output position
//! - Conservative pre-signing size estimation for fee planning
//! - Deterministic, bit-exact wire serialization of the (possibly
//!   partially signed) transaction handed between co-signers
//!
//! Key management, persistence, transport and broadcasting are external
//! collaborators: the crate never touches a private key and performs no
//! I/O.
//!
//! # Example
//!
//! ```rust
//! use txproposal::core::AddressType;
//! use txproposal::crypto::Network;
//! use txproposal::proposal::{ChangeAddress, Output, ProposalParams, TxProposal};
//!
//! // Propose a spend from a 2-of-3 wallet
//! let params = ProposalParams {
//!     wallet_id: "wallet-1".to_string(),
//!     creator_id: "copayer-1".to_string(),
//!     network: Network::Livenet,
//!     outputs: vec![Output {
//!         to_address: "CPrtPWbp8cCftTQu5fzuLG5zPJNDHMMf8X".to_string(),
//!         amount: 10_000_000,
//!         message: None,
//!     }],
//!     change_address: ChangeAddress {
//!         version: "1.0.0".to_string(),
//!         created_on: 0,
//!         address: "HHR21sjZ6yz6o7v124aMQBu4eGa4RBdUdS".to_string(),
//!         path: "m/1/0".to_string(),
//!         public_keys: vec![],
//!     },
//!     inputs: vec![],
//!     fee: 10_000,
//!     required_signatures: 2,
//!     required_rejections: 1,
//!     wallet_n: 3,
//!     address_type: AddressType::P2sh,
//!     message: None,
//!     id: None,
//! };
//!
//! let txp = TxProposal::create(params).unwrap();
//! assert!(txp.is_pending());
//! assert_eq!(txp.total_amount(), 10_000_000);
//! // one slot per declared output, plus the hidden change position
//! assert_eq!(txp.output_order.len(), 2);
//! ```

pub mod core;
pub mod crypto;
pub mod proposal;

// Re-export commonly used types
pub use self::core::{
    estimated_tx_size, AddressType, RawInput, RawOutput, RawTransaction, ScriptError,
    TransactionError, SIGHASH_ALL_FORKID,
};
pub use self::crypto::{Address, AddressError, AddressKind, KeyError, Network};
pub use self::proposal::{
    Action, ActionKind, ChangeAddress, Input, Output, ProposalError, ProposalParams,
    ProposalStatus, TxProposal, PROPOSAL_VERSION,
};
