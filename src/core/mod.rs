//! Transaction assembly components
//!
//! This module contains the wire-format building blocks:
//! - Encoding primitives (CompactSize varints, data pushes)
//! - Locking/unlocking script construction
//! - Raw transaction assembly and canonical serialization
//! - Pre-signing size estimation for fee planning

pub mod encode;
pub mod estimate;
pub mod script;
pub mod transaction;

pub use estimate::{estimated_tx_size, single_input_size, OUTPUT_SIZE, P2PKH_INPUT_SIZE, TX_OVERHEAD};
pub use script::{
    lock_script, multisig_redeem_script, p2pkh_lock_script, p2pkh_unlock_script,
    p2sh_lock_script, p2sh_multisig_unlock_script, AddressType, ScriptError,
    MAX_MULTISIG_KEYS, SIGHASH_ALL_FORKID,
};
pub use transaction::{
    RawInput, RawOutput, RawTransaction, TransactionError, SEQUENCE_FINAL, TX_VERSION,
};
