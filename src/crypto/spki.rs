// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SubjectPublicKeyInfo (X.509) parsing for device-exported public keys.
//!
//! Platform key stores export public keys as DER-encoded
//! SubjectPublicKeyInfo:
//!
//! ```text
//! SEQUENCE {
//!   SEQUENCE {               -- AlgorithmIdentifier
//!     OID 1.2.840.10045.2.1  -- id-ecPublicKey
//!     OID <named curve>      -- secp256k1 or prime256v1
//!   }
//!   BIT STRING {             -- subjectPublicKey
//!     0x00                   -- unused-bits byte, must be zero
//!     0x04 || X || Y         -- uncompressed SEC1 point, 65 bytes
//!   }
//! }
//! ```
//!
//! Address derivation only needs the point, so [`uncompressed_point`] is a
//! structure-only walk that accepts any named curve. [`parse`] additionally
//! resolves the curve OID and is what signature verification uses.

use super::{CryptoError, KeyAlgorithm};

/// id-ecPublicKey (1.2.840.10045.2.1)
const OID_EC_PUBLIC_KEY: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x02, 0x01];

/// secp256k1 (1.3.132.0.10)
const OID_SECP256K1: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x0A];

/// prime256v1 / secp256r1 (1.2.840.10045.3.1.7)
const OID_PRIME256V1: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];

const TAG_SEQUENCE: u8 = 0x30;
const TAG_OID: u8 = 0x06;
const TAG_BIT_STRING: u8 = 0x03;

/// A parsed device public key: curve tag plus the uncompressed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPublicKey {
    /// Curve the key lives on, resolved from the named-curve OID.
    pub algorithm: KeyAlgorithm,
    /// Uncompressed SEC1 point: `0x04 || X || Y`.
    pub point: [u8; 65],
}

/// Minimal DER TLV reader over a byte slice.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Read one TLV element, returning `(tag, contents)`.
    fn read_tlv(&mut self) -> Result<(u8, &'a [u8]), CryptoError> {
        if self.remaining() < 2 {
            return Err(CryptoError::MalformedKey(
                "truncated DER element".to_string(),
            ));
        }
        let tag = self.buf[self.pos];
        self.pos += 1;

        let first = self.buf[self.pos];
        self.pos += 1;
        let len = if first < 0x80 {
            first as usize
        } else {
            // Long form: low bits give the number of length octets.
            let num_octets = (first & 0x7F) as usize;
            if num_octets == 0 || num_octets > 2 || self.remaining() < num_octets {
                return Err(CryptoError::MalformedKey(
                    "unsupported DER length encoding".to_string(),
                ));
            }
            let mut len = 0usize;
            for _ in 0..num_octets {
                len = (len << 8) | self.buf[self.pos] as usize;
                self.pos += 1;
            }
            len
        };

        if self.remaining() < len {
            return Err(CryptoError::MalformedKey(format!(
                "DER element length {len} exceeds remaining {} bytes",
                self.remaining()
            )));
        }
        let contents = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok((tag, contents))
    }

    /// Read a TLV and require a specific tag.
    fn expect(&mut self, expected: u8, what: &str) -> Result<&'a [u8], CryptoError> {
        let (tag, contents) = self.read_tlv()?;
        if tag != expected {
            return Err(CryptoError::MalformedKey(format!(
                "expected {what} (tag 0x{expected:02x}), found tag 0x{tag:02x}"
            )));
        }
        Ok(contents)
    }
}

/// Walk the SPKI structure down to the BIT STRING and return
/// `(algorithm_identifier_contents, point_bytes)`.
fn split(der: &[u8]) -> Result<(&[u8], [u8; 65]), CryptoError> {
    let mut outer = Reader::new(der);
    let body = outer.expect(TAG_SEQUENCE, "SubjectPublicKeyInfo SEQUENCE")?;

    let mut inner = Reader::new(body);
    let algorithm = inner.expect(TAG_SEQUENCE, "AlgorithmIdentifier SEQUENCE")?;
    let bit_string = inner.expect(TAG_BIT_STRING, "subjectPublicKey BIT STRING")?;

    let Some((&unused_bits, key_bytes)) = bit_string.split_first() else {
        return Err(CryptoError::MalformedKey("empty BIT STRING".to_string()));
    };
    if unused_bits != 0x00 {
        return Err(CryptoError::MalformedKey(format!(
            "BIT STRING unused-bits byte must be 0x00, found 0x{unused_bits:02x}"
        )));
    }
    if key_bytes.len() != 65 {
        return Err(CryptoError::MalformedKey(format!(
            "expected 65-byte uncompressed point, found {} bytes",
            key_bytes.len()
        )));
    }
    if key_bytes[0] != 0x04 {
        return Err(CryptoError::MalformedKey(format!(
            "expected uncompressed-point marker 0x04, found 0x{:02x}",
            key_bytes[0]
        )));
    }

    let mut point = [0u8; 65];
    point.copy_from_slice(key_bytes);
    Ok((algorithm, point))
}

/// Extract the uncompressed point, ignoring which curve it lives on.
///
/// This is the structure-only parse address derivation uses: a key on an
/// unrecognized curve still yields a derived address. The relay's equality
/// check against the claimed address is the runtime guard for curve
/// mismatches, not this function.
pub fn uncompressed_point(der: &[u8]) -> Result<[u8; 65], CryptoError> {
    let (_, point) = split(der)?;
    Ok(point)
}

/// Fully parse the encoding, resolving the named-curve OID.
pub fn parse(der: &[u8]) -> Result<SubjectPublicKey, CryptoError> {
    let (algorithm_der, point) = split(der)?;

    let mut reader = Reader::new(algorithm_der);
    let key_oid = reader.expect(TAG_OID, "algorithm OID")?;
    if key_oid != OID_EC_PUBLIC_KEY {
        return Err(CryptoError::MalformedKey(format!(
            "not an EC public key (OID {})",
            hex_oid(key_oid)
        )));
    }

    let curve_oid = reader.expect(TAG_OID, "named-curve OID")?;
    let algorithm = if curve_oid == OID_SECP256K1 {
        KeyAlgorithm::Secp256k1
    } else if curve_oid == OID_PRIME256V1 {
        KeyAlgorithm::Secp256r1
    } else {
        return Err(CryptoError::UnsupportedCurve(hex_oid(curve_oid)));
    };

    Ok(SubjectPublicKey { algorithm, point })
}

fn hex_oid(oid: &[u8]) -> String {
    oid.iter().map(|b| format!("{b:02x}")).collect()
}
