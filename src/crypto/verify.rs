// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ECDSA signature verification over canonical message bytes.
//!
//! Devices sign with SHA-256-then-ECDSA and emit ASN.1 DER signatures, the
//! native output of platform key stores. Hardware-backed signers do not
//! guarantee low-S form, so signatures are normalized before verification.

use k256::ecdsa::signature::DigestVerifier;
use sha2::{Digest, Sha256};

use super::{spki, CryptoError, KeyAlgorithm};

/// Verify `signature_der` over `message` under the public key in
/// `public_key_der`.
///
/// Returns `Ok(())` only when the signature checks out; every failure mode
/// after key parsing collapses into [`CryptoError::SignatureInvalid`] so the
/// caller leaks nothing about which step rejected.
pub fn verify_signature(
    public_key_der: &[u8],
    message: &[u8],
    signature_der: &[u8],
) -> Result<(), CryptoError> {
    let key = spki::parse(public_key_der)?;

    match key.algorithm {
        KeyAlgorithm::Secp256k1 => {
            let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&key.point)
                .map_err(|e| CryptoError::MalformedKey(e.to_string()))?;
            let signature = k256::ecdsa::Signature::from_der(signature_der)
                .map_err(|_| CryptoError::SignatureInvalid)?;
            let signature = signature.normalize_s().unwrap_or(signature);
            verifying_key
                .verify_digest(Sha256::new_with_prefix(message), &signature)
                .map_err(|_| CryptoError::SignatureInvalid)
        }
        KeyAlgorithm::Secp256r1 => {
            let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&key.point)
                .map_err(|e| CryptoError::MalformedKey(e.to_string()))?;
            let signature = p256::ecdsa::Signature::from_der(signature_der)
                .map_err(|_| CryptoError::SignatureInvalid)?;
            let signature = signature.normalize_s().unwrap_or(signature);
            verifying_key
                .verify_digest(Sha256::new_with_prefix(message), &signature)
                .map_err(|_| CryptoError::SignatureInvalid)
        }
    }
}
