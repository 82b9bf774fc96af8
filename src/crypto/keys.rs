//! Public key parsing for script construction
//!
//! Inputs carry their authorized public keys as hex strings; script
//! construction validates them as real secp256k1 curve points before
//! embedding them in a script.

use secp256k1::PublicKey;
use thiserror::Error;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid public key hex: {0}")]
    InvalidHex(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Decode a hex public key, validating it is a point on the curve.
///
/// Returns the original bytes so the key's encoding (compressed or
/// uncompressed) is preserved in the scripts that embed it.
pub fn public_key_bytes_from_hex(hex_key: &str) -> Result<Vec<u8>, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidHex(hex_key.to_string()))?;
    PublicKey::from_slice(&bytes)
        .map_err(|_| KeyError::InvalidPublicKey(hex_key.to_string()))?;
    Ok(bytes)
}
