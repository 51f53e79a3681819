// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Device key management.
//!
//! A software stand-in for a hardware-backed key store: the keypair lives as
//! PKCS#8 PEM under `<data_dir>/identity/key.pem` and never leaves this
//! module in private form. The hardware traits that matter to the protocol
//! are modeled: the preferred curve may be unsupported (fallback to
//! secp256r1), and the key can be evicted out from under the process, after
//! which signing fails until a new identity is generated.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use k256::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand_core::OsRng;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::crypto::{address, CryptoError, KeyAlgorithm};

const KEY_FILE: &str = "key.pem";

/// Errors from key generation, persistence, and signing.
#[derive(Debug, thiserror::Error)]
pub enum DeviceKeyError {
    /// The key material is gone (evicted or never generated). The caller
    /// must run identity generation again and accept a new address.
    #[error("device key unavailable, regenerate the identity")]
    KeyUnavailable,

    #[error("key store supports none of the requested curves")]
    NoSupportedCurve,

    #[error("key encoding failed: {0}")]
    Encoding(String),

    #[error("key store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// The public half of a device identity.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    /// X.509 SubjectPublicKeyInfo DER, the form the relay expects.
    pub public_key_der: Vec<u8>,
    pub algorithm: KeyAlgorithm,
    /// Checksummed chain address derived from the public key.
    pub address: String,
}

/// A generated keypair on one of the supported curves.
enum DeviceKeyPair {
    Secp256k1(k256::SecretKey),
    Secp256r1(p256::SecretKey),
}

impl DeviceKeyPair {
    fn generate(curve: KeyAlgorithm) -> Self {
        match curve {
            KeyAlgorithm::Secp256k1 => Self::Secp256k1(k256::SecretKey::random(&mut OsRng)),
            KeyAlgorithm::Secp256r1 => Self::Secp256r1(p256::SecretKey::random(&mut OsRng)),
        }
    }

    fn load(path: &Path) -> Result<Self, DeviceKeyError> {
        let pem = std::fs::read_to_string(path)?;
        if let Ok(secret) = k256::SecretKey::from_pkcs8_pem(&pem) {
            return Ok(Self::Secp256k1(secret));
        }
        if let Ok(secret) = p256::SecretKey::from_pkcs8_pem(&pem) {
            return Ok(Self::Secp256r1(secret));
        }
        Err(DeviceKeyError::Encoding(
            "key file is not a PKCS#8 EC key on a supported curve".to_string(),
        ))
    }

    fn persist(&self, path: &Path) -> Result<(), DeviceKeyError> {
        let pem = match self {
            Self::Secp256k1(secret) => secret.to_pkcs8_pem(LineEnding::LF),
            Self::Secp256r1(secret) => secret.to_pkcs8_pem(LineEnding::LF),
        }
        .map_err(|e| DeviceKeyError::Encoding(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, pem.as_bytes())?;
        Ok(())
    }

    fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Secp256k1(_) => KeyAlgorithm::Secp256k1,
            Self::Secp256r1(_) => KeyAlgorithm::Secp256r1,
        }
    }

    fn public_key_der(&self) -> Result<Vec<u8>, DeviceKeyError> {
        let der = match self {
            Self::Secp256k1(secret) => secret.public_key().to_public_key_der(),
            Self::Secp256r1(secret) => secret.public_key().to_public_key_der(),
        }
        .map_err(|e| DeviceKeyError::Encoding(e.to_string()))?;
        Ok(der.as_bytes().to_vec())
    }

    /// SHA-256-then-ECDSA, ASN.1 DER signature.
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        match self {
            Self::Secp256k1(secret) => {
                use k256::ecdsa::signature::DigestSigner;
                let signing_key = k256::ecdsa::SigningKey::from(secret);
                let signature: k256::ecdsa::Signature =
                    signing_key.sign_digest(Sha256::new_with_prefix(payload));
                signature.to_der().as_bytes().to_vec()
            }
            Self::Secp256r1(secret) => {
                use p256::ecdsa::signature::DigestSigner;
                let signing_key = p256::ecdsa::SigningKey::from(secret);
                let signature: p256::ecdsa::Signature =
                    signing_key.sign_digest(Sha256::new_with_prefix(payload));
                signature.to_der().as_bytes().to_vec()
            }
        }
    }
}

/// Owns the device keypair and its on-disk persistence.
pub struct KeyManager {
    key_path: PathBuf,
    supported: Vec<KeyAlgorithm>,
    key: RwLock<Option<DeviceKeyPair>>,
}

impl KeyManager {
    /// Key manager rooted at `data_dir`, preferring secp256k1 with a
    /// secp256r1 fallback.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_supported_curves(
            data_dir,
            vec![KeyAlgorithm::Secp256k1, KeyAlgorithm::Secp256r1],
        )
    }

    /// Key manager restricted to the given curves, in preference order.
    /// Models hardware whose key store rejects secp256k1.
    pub fn with_supported_curves(data_dir: &Path, supported: Vec<KeyAlgorithm>) -> Self {
        Self {
            key_path: data_dir.join("identity").join(KEY_FILE),
            supported,
            key: RwLock::new(None),
        }
    }

    /// Load the persisted identity, generating and persisting one if none
    /// exists. Idempotent: repeated calls return the same identity.
    pub fn get_or_create_identity(&self) -> Result<DeviceIdentity, DeviceKeyError> {
        let mut guard = self.key.write().unwrap_or_else(PoisonError::into_inner);

        if guard.is_none() {
            if self.key_path.exists() {
                *guard = Some(DeviceKeyPair::load(&self.key_path)?);
            } else {
                let curve = self
                    .supported
                    .first()
                    .copied()
                    .ok_or(DeviceKeyError::NoSupportedCurve)?;
                if curve != KeyAlgorithm::Secp256k1 {
                    warn!(
                        curve = %curve,
                        "secp256k1 not supported by this key store, generating fallback key"
                    );
                }
                let pair = DeviceKeyPair::generate(curve);
                pair.persist(&self.key_path)?;
                info!(curve = %pair.algorithm(), "generated new device identity");
                *guard = Some(pair);
            }
        }

        let Some(pair) = guard.as_ref() else {
            return Err(DeviceKeyError::KeyUnavailable);
        };
        let public_key_der = pair.public_key_der()?;
        let address = address::derive(&public_key_der)?;
        Ok(DeviceIdentity {
            public_key_der,
            algorithm: pair.algorithm(),
            address,
        })
    }

    /// Sign `payload` with the device key (SHA-256-then-ECDSA, DER output).
    ///
    /// Fails with [`DeviceKeyError::KeyUnavailable`] when the key file has
    /// been evicted since it was loaded. Recovery is a fresh
    /// [`get_or_create_identity`](Self::get_or_create_identity) call, which
    /// yields a NEW address the caller must surface.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, DeviceKeyError> {
        if !self.key_path.exists() {
            let mut guard = self.key.write().unwrap_or_else(PoisonError::into_inner);
            *guard = None;
            return Err(DeviceKeyError::KeyUnavailable);
        }

        let guard = self.key.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(pair) => Ok(pair.sign(payload)),
            None => Err(DeviceKeyError::KeyUnavailable),
        }
    }
}
