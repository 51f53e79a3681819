// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! D-Linker - Hardware-Anchored Device Identity & Token Relay
//!
//! Devices hold an elliptic-curve keypair inside a protected key store and
//! prove ownership of the derived chain address by signing canonical request
//! messages. The relay re-derives the address from the supplied public key,
//! validates the signature, and only then submits token operations (mint,
//! transfer) to the external ERC-20 ledger on the device's behalf.
//!
//! ## Modules
//!
//! - `api` - Relay HTTP endpoints (Axum)
//! - `auth` - Signed-request verification (address + signature + key pinning)
//! - `crypto` - Address derivation, canonical messages, signature checks
//! - `device` - Device-side key store, request signer, relay client, poller
//! - `ledger` - External ledger gateway (EVM JSON-RPC via alloy)
//! - `storage` - Per-address account registry (redb)
//! - `cache` - Last-observed balance cache

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod device;
pub mod error;
pub mod ledger;
pub mod models;
pub mod state;
pub mod storage;
