// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain address derivation from a device public key.
//!
//! The address is the low 20 bytes of keccak256 over the raw X||Y affine
//! coordinates (marker byte dropped), rendered as EIP-55 checksummed hex.
//! keccak256 is the address hash; the SHA-256 digest is only used for
//! request signing.

use alloy::primitives::{keccak256, Address};

use super::{spki, CryptoError};

/// Derive the checksummed chain address from a SubjectPublicKeyInfo encoding.
///
/// Deterministic and total over well-formed input; fails with
/// [`CryptoError::MalformedKey`] otherwise. Keys on a non-native curve still
/// derive an address. The relay's claimed-address equality check is the only
/// runtime guard against curve mismatch.
pub fn derive(public_key_der: &[u8]) -> Result<String, CryptoError> {
    let point = spki::uncompressed_point(public_key_der)?;
    let hash = keccak256(&point[1..]);
    let address = Address::from_slice(&hash[12..]);
    Ok(address.to_checksum(None))
}

/// Case-insensitive address equality on the hex form.
pub fn matches(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Check the `0x` + 40-hex-chars shape of an address string.
///
/// Checksum casing is not enforced here; clients send lowercased addresses.
pub fn is_well_formed(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::pkcs8::EncodePublicKey;
    use rand_core::OsRng;
    use std::str::FromStr;

    fn spki_for(secret: &k256::SecretKey) -> Vec<u8> {
        secret
            .public_key()
            .to_public_key_der()
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    #[test]
    fn known_secp256k1_vector() {
        // Private key 0x...01 has the canonical well-known address.
        let mut key = [0u8; 32];
        key[31] = 1;
        let secret = k256::SecretKey::from_slice(&key).unwrap();
        let address = derive(&spki_for(&secret)).unwrap();
        assert_eq!(address, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
    }

    #[test]
    fn derivation_is_deterministic() {
        let secret = k256::SecretKey::random(&mut OsRng);
        let der = spki_for(&secret);
        assert_eq!(derive(&der).unwrap(), derive(&der).unwrap());
    }

    #[test]
    fn checksum_casing_is_self_consistent() {
        // alloy's FromStr validates EIP-55 casing for mixed-case input, so a
        // successful re-parse proves the produced checksum is valid.
        let secret = k256::SecretKey::random(&mut OsRng);
        let address = derive(&spki_for(&secret)).unwrap();
        assert!(Address::from_str(&address).is_ok());
    }

    #[test]
    fn secp256r1_keys_also_derive() {
        let secret = p256::SecretKey::random(&mut OsRng);
        let der = secret
            .public_key()
            .to_public_key_der()
            .unwrap()
            .as_bytes()
            .to_vec();
        let address = derive(&der).unwrap();
        assert!(is_well_formed(&address.to_lowercase()));
    }

    #[test]
    fn short_input_never_yields_an_address() {
        let secret = k256::SecretKey::random(&mut OsRng);
        let der = spki_for(&secret);
        let result = derive(&der[..der.len() / 2]);
        assert!(matches!(result, Err(CryptoError::MalformedKey(_))));
    }

    #[test]
    fn address_comparison_ignores_case() {
        assert!(matches(
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        ));
        assert!(!matches(
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
            "0x0000000000000000000000000000000000000000"
        ));
    }

    #[test]
    fn well_formedness() {
        assert!(is_well_formed("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"));
        assert!(!is_well_formed("7e5f4552091a69125d5dfcb7b8c2659029395bdf"));
        assert!(!is_well_formed("0x7e5f"));
        assert!(!is_well_formed("0xzz5f4552091a69125d5dfcb7b8c2659029395bdf"));
    }
}
