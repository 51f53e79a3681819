// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Builds signed relay requests from the device identity.

use base64ct::{Base64, Encoding};

use crate::crypto::message;

use super::keystore::{DeviceKeyError, KeyManager};

/// The two relay operations a device can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Airdrop,
    Transfer,
}

/// A fully signed request, ready for the wire.
///
/// `signature` and `public_key` are base64; `message` is kept so callers can
/// log or inspect exactly what was signed.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub operation: OperationKind,
    pub from_address: String,
    pub to_address: Option<String>,
    pub amount: Option<String>,
    pub message: String,
    pub signature: String,
    pub public_key: String,
}

/// Signs canonical request messages with the device key.
pub struct RequestSigner<'a> {
    keys: &'a KeyManager,
}

impl<'a> RequestSigner<'a> {
    pub fn new(keys: &'a KeyManager) -> Self {
        Self { keys }
    }

    /// Sign an airdrop request for the device's own address.
    pub fn airdrop(&self) -> Result<SignedRequest, DeviceKeyError> {
        let identity = self.keys.get_or_create_identity()?;
        let from = identity.address.to_lowercase();
        let msg = message::airdrop_message(&from);
        let signature = self.keys.sign(msg.as_bytes())?;

        Ok(SignedRequest {
            operation: OperationKind::Airdrop,
            from_address: from,
            to_address: None,
            amount: None,
            message: msg,
            signature: Base64::encode_string(&signature),
            public_key: Base64::encode_string(&identity.public_key_der),
        })
    }

    /// Sign a transfer of `amount` tokens to `to`.
    pub fn transfer(&self, to: &str, amount: &str) -> Result<SignedRequest, DeviceKeyError> {
        let identity = self.keys.get_or_create_identity()?;
        let from = identity.address.to_lowercase();
        let msg = message::transfer_message(to, amount);
        let signature = self.keys.sign(msg.as_bytes())?;

        Ok(SignedRequest {
            operation: OperationKind::Transfer,
            from_address: from,
            to_address: Some(to.to_lowercase()),
            amount: Some(message::normalize_amount(amount).to_string()),
            message: msg,
            signature: Base64::encode_string(&signature),
            public_key: Base64::encode_string(&identity.public_key_der),
        })
    }
}
