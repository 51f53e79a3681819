// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed-request verification.
//!
//! Every state-changing request passes through [`RelayVerifier::authorize`]
//! before anything else happens. The pipeline is strictly ordered:
//!
//! 1. decode the supplied key and signature;
//! 2. re-derive the address from the key and compare with the claim;
//! 3. fetch the pinned key for registered addresses and reject any other
//!    supplied key;
//! 4. verify the signature under the pinned key (the supplied key only for
//!    an unregistered address);
//! 5. register the key, on first use only, after everything has passed.
//!
//! Any failure rejects the request with no partial execution: a rejected
//! request leaves no registration behind and the ledger is never touched.

use base64ct::{Base64, Encoding};
use tracing::warn;

use crate::crypto::{address, verify, CryptoError};
use crate::storage::{AccountStore, Registration, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("malformed public key: {0}")]
    MalformedKey(String),

    #[error("claimed address does not match the supplied public key")]
    AddressMismatch,

    #[error("signature verification failed")]
    SignatureInvalid,

    /// The address is already bound to a different key. Keys are pinned at
    /// first use; rotation is not part of the protocol.
    #[error("address is already registered with a different key")]
    KeyRotationNotAllowed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CryptoError> for AuthError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::MalformedKey(detail) => AuthError::MalformedKey(detail),
            CryptoError::UnsupportedCurve(oid) => {
                AuthError::MalformedKey(format!("unsupported curve OID {oid}"))
            }
            CryptoError::SignatureInvalid => AuthError::SignatureInvalid,
        }
    }
}

/// Verifies ownership of a claimed address for one request.
pub struct RelayVerifier<'a> {
    accounts: &'a AccountStore,
}

impl<'a> RelayVerifier<'a> {
    pub fn new(accounts: &'a AccountStore) -> Self {
        Self { accounts }
    }

    /// Authorize a request claiming to come from `claimed_from`.
    ///
    /// `public_key_b64` and `signature_b64` are the wire encodings;
    /// `message` is the canonical message reconstructed from the request
    /// fields by the caller.
    pub fn authorize(
        &self,
        claimed_from: &str,
        public_key_b64: &str,
        signature_b64: &str,
        message: &str,
    ) -> Result<(), AuthError> {
        let supplied_key = Base64::decode_vec(public_key_b64)
            .map_err(|e| AuthError::MalformedKey(format!("base64: {e}")))?;
        let signature =
            Base64::decode_vec(signature_b64).map_err(|_| AuthError::SignatureInvalid)?;

        let derived = address::derive(&supplied_key)?;
        if !address::matches(&derived, claimed_from) {
            warn!(
                claimed = %claimed_from,
                derived = %derived,
                "address claim does not match supplied key, possible spoofing"
            );
            return Err(AuthError::AddressMismatch);
        }

        // Compare decoded bytes, not base64 text: padding or whitespace
        // variants of the same key are not a rotation.
        let stored = self.accounts.get(claimed_from)?;
        let verifying_key = match &stored {
            Some(record) => {
                let stored_key = Base64::decode_vec(&record.public_key)
                    .map_err(|e| AuthError::MalformedKey(format!("stored key: {e}")))?;
                if stored_key != supplied_key {
                    warn!(address = %claimed_from, "rejected key rotation attempt");
                    return Err(AuthError::KeyRotationNotAllowed);
                }
                stored_key
            }
            None => supplied_key.clone(),
        };

        verify::verify_signature(&verifying_key, message.as_bytes(), &signature)?;

        // Registration is the final step so a rejected request persists
        // nothing. The CAS still decides a concurrent first-use race.
        if stored.is_none() {
            let registration = self
                .accounts
                .register_or_get_key(&claimed_from.to_lowercase(), public_key_b64)?;
            if let Registration::Existing(record) = registration {
                let winner = Base64::decode_vec(&record.public_key)
                    .map_err(|e| AuthError::MalformedKey(format!("stored key: {e}")))?;
                if winner != supplied_key {
                    warn!(address = %claimed_from, "lost first-use registration race");
                    return Err(AuthError::KeyRotationNotAllowed);
                }
            }
        }
        Ok(())
    }
}
