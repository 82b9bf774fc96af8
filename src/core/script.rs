//! Locking and unlocking script construction
//!
//! Builds the output locking scripts (P2PKH, P2SH) and the input unlocking
//! scripts used to carry a partially signed multisig transaction between
//! co-signers. The partial form is a transport format: it only becomes a
//! consensus-valid unlock once the full signature threshold is embedded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::encode::write_push;
use crate::crypto::address::{Address, AddressKind};
use crate::crypto::keys::{public_key_bytes_from_hex, KeyError};

// =============================================================================
// Constants
// =============================================================================

/// Sighash flag appended to every embedded signature: SIGHASH_ALL | SIGHASH_FORKID
pub const SIGHASH_ALL_FORKID: u8 = 0x41;

/// Largest multisig quorum expressible with the OP_1..OP_16 opcodes
pub const MAX_MULTISIG_KEYS: usize = 16;

const OP_0: u8 = 0x00;
const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKMULTISIG: u8 = 0xae;

/// OP_1..OP_16 for a small integer n
fn op_n(n: usize) -> u8 {
    0x50 + n as u8
}

// =============================================================================
// Errors
// =============================================================================

/// Script construction errors
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Invalid multisig quorum: {required} of {total}")]
    InvalidThreshold { required: usize, total: usize },
    #[error("Input has no public keys")]
    MissingPublicKey,
    #[error(transparent)]
    Key(#[from] KeyError),
}

// =============================================================================
// Address type
// =============================================================================

/// The script type of the wallet's spendable inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddressType {
    P2pkh,
    P2sh,
}

// =============================================================================
// Locking scripts
// =============================================================================

/// P2PKH locking script: OP_DUP OP_HASH160 <20-byte-hash> OP_EQUALVERIFY OP_CHECKSIG
pub fn p2pkh_lock_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.push(OP_DUP);
    script.push(OP_HASH160);
    write_push(&mut script, pubkey_hash);
    script.push(OP_EQUALVERIFY);
    script.push(OP_CHECKSIG);
    script
}

/// P2SH locking script: OP_HASH160 <20-byte-hash> OP_EQUAL
pub fn p2sh_lock_script(script_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(23);
    script.push(OP_HASH160);
    write_push(&mut script, script_hash);
    script.push(OP_EQUAL);
    script
}

/// Locking script for a decoded destination address
pub fn lock_script(address: &Address) -> Vec<u8> {
    match address.kind {
        AddressKind::PubkeyHash => p2pkh_lock_script(&address.hash),
        AddressKind::ScriptHash => p2sh_lock_script(&address.hash),
    }
}

// =============================================================================
// Multisig redeem script
// =============================================================================

/// m-of-n redeem script: OP_m <pubkey>... OP_n OP_CHECKMULTISIG
///
/// Key order is the input's fixed public-key order, not signer-submission
/// order. Each key is validated as a curve point but embedded in its
/// original byte form.
pub fn multisig_redeem_script(
    public_keys: &[String],
    required: usize,
) -> Result<Vec<u8>, ScriptError> {
    let total = public_keys.len();
    if required == 0 || required > total || total > MAX_MULTISIG_KEYS {
        return Err(ScriptError::InvalidThreshold { required, total });
    }

    let mut script = Vec::with_capacity(3 + total * 34);
    script.push(op_n(required));
    for key in public_keys {
        let bytes = public_key_bytes_from_hex(key)?;
        write_push(&mut script, &bytes);
    }
    script.push(op_n(total));
    script.push(OP_CHECKMULTISIG);
    Ok(script)
}

// =============================================================================
// Unlocking scripts
// =============================================================================

/// Append the sighash flag to a DER signature
fn sig_with_hash_type(signature: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(signature.len() + 1);
    out.extend_from_slice(signature);
    out.push(SIGHASH_ALL_FORKID);
    out
}

/// P2SH multisig unlocking script carrying the signatures collected so far:
/// OP_0 <sig||0x41>... <redeem script>
///
/// The leading OP_0 feeds OP_CHECKMULTISIG's extra stack pop.
pub fn p2sh_multisig_unlock_script(signatures: &[Vec<u8>], redeem_script: &[u8]) -> Vec<u8> {
    let mut script = vec![OP_0];
    for sig in signatures {
        write_push(&mut script, &sig_with_hash_type(sig));
    }
    write_push(&mut script, redeem_script);
    script
}

/// P2PKH unlocking script: <sig||0x41> <pubkey>
pub fn p2pkh_unlock_script(signature: &[u8], public_key: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(2 + signature.len() + 1 + public_key.len());
    write_push(&mut script, &sig_with_hash_type(signature));
    write_push(&mut script, public_key);
    script
}
