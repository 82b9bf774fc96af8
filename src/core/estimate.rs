//! Pre-signing transaction size estimation
//!
//! Fee planning happens before all signatures are collected, so the
//! estimate assumes a fully signed transaction with worst-case signature
//! sizes rather than measuring whatever partial set currently exists.

use crate::core::script::AddressType;

// =============================================================================
// Constants
// =============================================================================

/// Version + locktime fields plus padded input/output count varints
pub const TX_OVERHEAD: usize = 4 + 4 + 9 + 9;

/// Serialized size of one output (value, script length, script)
pub const OUTPUT_SIZE: usize = 34;

/// Fully signed P2PKH input: outpoint, scriptSig with signature and
/// pubkey, sequence
pub const P2PKH_INPUT_SIZE: usize = 147;

/// Headroom over the raw structural estimate
const SIZE_SAFETY_MARGIN: f64 = 0.02;

// =============================================================================
// Estimation
// =============================================================================

/// Upper-bound serialized size of a single fully signed input.
///
/// The P2SH multisig bound covers the outpoint and sequence, a worst-case
/// 72-byte DER signature per required signer, and the redeem script's
/// 34 bytes per public key.
pub fn single_input_size(
    address_type: AddressType,
    required_signatures: u8,
    wallet_n: u8,
) -> usize {
    match address_type {
        AddressType::P2pkh => P2PKH_INPUT_SIZE,
        AddressType::P2sh => {
            required_signatures as usize * 72 + wallet_n as usize * 36 + 44
        }
    }
}

/// Expected serialized byte length of the assembled transaction.
///
/// Counts one extra output for change, and at least one declared output
/// even if none are attached yet.
pub fn estimated_tx_size(
    n_inputs: usize,
    n_outputs: usize,
    address_type: AddressType,
    required_signatures: u8,
    wallet_n: u8,
) -> usize {
    let input_size = single_input_size(address_type, required_signatures, wallet_n);
    let nb_outputs = n_outputs.max(1) + 1;
    let size = TX_OVERHEAD + input_size * n_inputs + OUTPUT_SIZE * nb_outputs;
    (size as f64 * (1.0 + SIZE_SAFETY_MARGIN)).round() as usize
}
