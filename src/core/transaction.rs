//! Raw transaction assembly and canonical serialization
//!
//! The wire layout is the standard little-endian format: version,
//! CompactSize-prefixed input and output lists, locktime. Outpoint txids
//! are displayed big-endian but serialized reversed; `txid()` reverses the
//! double SHA-256 of the serialized bytes back into display order.

use thiserror::Error;

use crate::core::encode::write_varint;
use crate::crypto::hash::double_sha256;

// =============================================================================
// Constants
// =============================================================================

/// Wire version of assembled transactions
pub const TX_VERSION: u32 = 1;

/// Sequence number marking an input final (no locktime, no replacement)
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

// =============================================================================
// Errors
// =============================================================================

/// Raw transaction errors
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Invalid source txid '{txid}': {reason}")]
    InvalidTxid { txid: String, reason: String },
}

// =============================================================================
// Transaction structure
// =============================================================================

/// A transaction input referencing its source outpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    /// Source txid in wire byte order (reversed from display order)
    pub prev_txid: [u8; 32],
    pub vout: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl RawInput {
    /// Build an input from a display-order txid hex string
    pub fn new(txid: &str, vout: u32, script_sig: Vec<u8>) -> Result<Self, TransactionError> {
        let mut bytes = hex::decode(txid).map_err(|e| TransactionError::InvalidTxid {
            txid: txid.to_string(),
            reason: e.to_string(),
        })?;
        if bytes.len() != 32 {
            return Err(TransactionError::InvalidTxid {
                txid: txid.to_string(),
                reason: format!("expected 32 bytes, got {}", bytes.len()),
            });
        }
        bytes.reverse();
        let mut prev_txid = [0u8; 32];
        prev_txid.copy_from_slice(&bytes);
        Ok(Self {
            prev_txid,
            vout,
            script_sig,
            sequence: SEQUENCE_FINAL,
        })
    }
}

/// A transaction output: value plus locking script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub satoshis: u64,
    pub script_pubkey: Vec<u8>,
}

/// An assembled transaction ready for serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub version: u32,
    pub inputs: Vec<RawInput>,
    pub outputs: Vec<RawOutput>,
    pub locktime: u32,
}

impl RawTransaction {
    /// Serialize to the canonical wire byte sequence
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());

        write_varint(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.extend_from_slice(&input.prev_txid);
            buf.extend_from_slice(&input.vout.to_le_bytes());
            write_varint(&mut buf, input.script_sig.len() as u64);
            buf.extend_from_slice(&input.script_sig);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_varint(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            buf.extend_from_slice(&output.satoshis.to_le_bytes());
            write_varint(&mut buf, output.script_pubkey.len() as u64);
            buf.extend_from_slice(&output.script_pubkey);
        }

        buf.extend_from_slice(&self.locktime.to_le_bytes());
        buf
    }

    /// Lowercase hex of the serialized transaction
    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    /// Transaction id: double SHA-256 of the serialized bytes, reversed to
    /// display order
    pub fn txid(&self) -> String {
        let mut hash = double_sha256(&self.serialize());
        hash.reverse();
        hex::encode(hash)
    }
}
