// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity cryptography shared by the device and the relay.
//!
//! The device exports its public key in the platform key-store format
//! (X.509 SubjectPublicKeyInfo DER); the chain address is derived from the
//! uncompressed point inside that encoding. Both sides build the exact same
//! canonical message bytes, so verification is byte-for-byte reproducible.

pub mod address;
pub mod message;
pub mod spki;
pub mod verify;

use serde::{Deserialize, Serialize};

/// Elliptic curve a device key was generated on.
///
/// secp256k1 is the chain-native curve; secp256r1 is the fallback for key
/// stores whose hardware does not support secp256k1. The variant is carried
/// alongside the public key so verification always knows which curve/digest
/// pairing applies instead of assuming one globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// secp256k1 (chain-native)
    Secp256k1,
    /// secp256r1 / NIST P-256 (key-store fallback)
    Secp256r1,
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyAlgorithm::Secp256k1 => write!(f, "secp256k1"),
            KeyAlgorithm::Secp256r1 => write!(f, "secp256r1"),
        }
    }
}

/// Errors from public-key parsing, address derivation, and verification.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("malformed public key: {0}")]
    MalformedKey(String),

    #[error("unsupported curve OID: {0}")]
    UnsupportedCurve(String),

    #[error("signature verification failed")]
    SignatureInvalid,
}
