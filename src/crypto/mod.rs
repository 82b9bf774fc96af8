//! Cryptographic utilities for the proposal engine
//!
//! This module provides:
//! - SHA-256 / HASH160 hashing
//! - secp256k1 public key parsing
//! - Base58Check address encoding and decoding

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{p2sh_address, Address, AddressError, AddressKind, Network};
pub use hash::{double_sha256, hash160, sha256};
pub use keys::{public_key_bytes_from_hex, KeyError};
