// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the relay REST API. All types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! Field names are camelCase on the wire. Addresses arrive lowercased from
//! devices; `publicKey` and `signature` are base64 (SubjectPublicKeyInfo DER
//! and ASN.1 DER ECDSA respectively).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Airdrop request: mint the configured amount to the claimed address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AirdropRequest {
    /// Claimed recipient address (must match the key-derived address).
    pub address: String,
    /// Base64 SubjectPublicKeyInfo DER.
    pub public_key: String,
    /// Base64 DER ECDSA signature over the canonical airdrop message.
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AirdropResponse {
    pub success: bool,
    /// Hash of the confirmed mint transaction.
    pub tx_hash: String,
    /// Post-mint balance, decimal token units.
    pub balance: String,
}

/// Transfer request: move tokens from the signer's address to `to`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Claimed sender address (must match the key-derived address).
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Decimal token amount, e.g. `"10"` or `"10.5"`.
    pub amount: String,
    /// Base64 DER ECDSA signature over the canonical transfer message.
    pub signature: String,
    /// Base64 SubjectPublicKeyInfo DER.
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub success: bool,
    pub tx_hash: String,
}

/// Balance sync request: force an authoritative ledger re-read.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncBalanceRequest {
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub success: bool,
    /// Authoritative balance just read from the ledger, decimal token units.
    pub balance: String,
}

/// Cached balance read. Never hits the ledger; `balance` is absent when the
/// address has no cached value yet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CachedBalanceResponse {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Uniform error envelope for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Stable machine-readable error kind, e.g. `address_mismatch`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}
