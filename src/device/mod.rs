// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Device-side components.
//!
//! Everything a device needs to participate in the relay protocol: a key
//! manager over the local key store, a request signer that produces signed
//! wire payloads, an HTTP client for the relay endpoints, and a background
//! balance poller.

pub mod client;
pub mod keystore;
pub mod poller;
pub mod signer;

pub use client::{RelayClient, RelayClientError};
pub use keystore::{DeviceIdentity, DeviceKeyError, KeyManager};
pub use poller::BalancePoller;
pub use signer::{OperationKind, RequestSigner, SignedRequest};
