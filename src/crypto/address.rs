//! Base58Check address handling
//!
//! Addresses are Base58Check-encoded `version || HASH160` payloads. The
//! version byte selects both the network and the script kind, so decoding
//! an address yields everything needed to build its locking script.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hash::hash160;

/// Address-related errors
#[derive(Error, Debug)]
pub enum AddressError {
    #[error("Invalid Base58Check encoding for '{address}': {reason}")]
    InvalidEncoding { address: String, reason: String },
    #[error("Invalid address payload length: {0} bytes (expected 21)")]
    InvalidLength(usize),
    #[error("Unknown address version byte 0x{0:02x} for this network")]
    UnknownVersion(u8),
}

/// Network selector, passed explicitly into proposal creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Livenet,
    Testnet,
}

impl Network {
    /// Version byte for pay-to-pubkey-hash addresses
    pub fn pubkeyhash_version(&self) -> u8 {
        match self {
            Network::Livenet => 0x1c,
            Network::Testnet => 0x6f,
        }
    }

    /// Version byte for pay-to-script-hash addresses
    pub fn scripthash_version(&self) -> u8 {
        match self {
            Network::Livenet => 0x28,
            Network::Testnet => 0xc4,
        }
    }
}

/// The kind of destination an address encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    PubkeyHash,
    ScriptHash,
}

/// A decoded address: script kind plus its 20-byte hash payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub kind: AddressKind,
    pub hash: [u8; 20],
}

impl Address {
    /// Decode a Base58Check address against the given network's version bytes
    pub fn decode(address: &str, network: Network) -> Result<Self, AddressError> {
        let payload = bs58::decode(address)
            .with_check(None)
            .into_vec()
            .map_err(|e| AddressError::InvalidEncoding {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        if payload.len() != 21 {
            return Err(AddressError::InvalidLength(payload.len()));
        }

        let kind = if payload[0] == network.pubkeyhash_version() {
            AddressKind::PubkeyHash
        } else if payload[0] == network.scripthash_version() {
            AddressKind::ScriptHash
        } else {
            return Err(AddressError::UnknownVersion(payload[0]));
        };

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..21]);
        Ok(Self { kind, hash })
    }

    /// Encode back to the Base58Check string form
    pub fn encode(&self, network: Network) -> String {
        let version = match self.kind {
            AddressKind::PubkeyHash => network.pubkeyhash_version(),
            AddressKind::ScriptHash => network.scripthash_version(),
        };
        let mut payload = Vec::with_capacity(21);
        payload.push(version);
        payload.extend_from_slice(&self.hash);
        bs58::encode(payload).with_check().into_string()
    }
}

/// Derive the P2SH address of a redeem script: Base58Check(version || HASH160(script))
pub fn p2sh_address(redeem_script: &[u8], network: Network) -> String {
    let address = Address {
        kind: AddressKind::ScriptHash,
        hash: hash160(redeem_script),
    };
    address.encode(network)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pubkeyhash_address() {
        let addr = Address::decode("CPrtPWbp8cCftTQu5fzuLG5zPJNDHMMf8X", Network::Livenet).unwrap();
        assert_eq!(addr.kind, AddressKind::PubkeyHash);
        assert_eq!(
            hex::encode(addr.hash),
            "51224bca38efcaa31d5340917c3f3f713b8b20e4"
        );
    }

    #[test]
    fn test_decode_scripthash_address() {
        let addr = Address::decode("HHR21sjZ6yz6o7v124aMQBu4eGa4RBdUdS", Network::Livenet).unwrap();
        assert_eq!(addr.kind, AddressKind::ScriptHash);
        assert_eq!(
            hex::encode(addr.hash),
            "778192003f0e9e1d865c082179cc3dae5464b03d"
        );
    }

    #[test]
    fn test_round_trip() {
        let original = "HMtvqBXNuhiizxofi9LC5tT69M3RRLu1FT";
        let addr = Address::decode(original, Network::Livenet).unwrap();
        assert_eq!(addr.encode(Network::Livenet), original);
    }

    #[test]
    fn test_rejects_wrong_network_version() {
        // A valid Base58Check string whose version byte (0x00) belongs to
        // neither livenet nor testnet here
        let result = Address::decode("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", Network::Livenet);
        assert!(matches!(result, Err(AddressError::UnknownVersion(0x00))));
    }

    #[test]
    fn test_rejects_corrupted_checksum() {
        let result = Address::decode("CPrtPWbp8cCftTQu5fzuLG5zPJNDHMMf8Y", Network::Livenet);
        assert!(matches!(result, Err(AddressError::InvalidEncoding { .. })));
    }

    #[test]
    fn test_testnet_versions_differ() {
        assert_ne!(
            Network::Livenet.pubkeyhash_version(),
            Network::Testnet.pubkeyhash_version()
        );
        let addr = Address {
            kind: AddressKind::PubkeyHash,
            hash: [0x42; 20],
        };
        assert_ne!(addr.encode(Network::Livenet), addr.encode(Network::Testnet));
    }
}
