// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the relay endpoints.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::models::{
    AirdropRequest, AirdropResponse, BalanceResponse, CachedBalanceResponse, ErrorResponse,
    SyncBalanceRequest, TransferRequest, TransferResponse,
};

use super::signer::SignedRequest;

#[derive(Debug, thiserror::Error)]
pub enum RelayClientError {
    #[error("relay URL invalid: {0}")]
    Url(#[from] url::ParseError),

    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The signed request lacks a field this endpoint needs (e.g. a
    /// transfer request without a recipient).
    #[error("signed request is missing the `{0}` field")]
    IncompleteRequest(&'static str),

    /// The relay answered with its error envelope.
    #[error("relay rejected the request ({kind}): {message}")]
    Rejected {
        status: u16,
        kind: String,
        message: String,
    },
}

/// Typed client over the relay's REST surface.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base: Url,
    http: Client,
}

impl RelayClient {
    /// Client against the relay at `base` (e.g. `https://relay.example/`).
    pub fn new(base: Url) -> Self {
        Self {
            base,
            http: Client::new(),
        }
    }

    /// Submit a signed airdrop request.
    pub async fn request_airdrop(
        &self,
        request: &SignedRequest,
    ) -> Result<AirdropResponse, RelayClientError> {
        let body = AirdropRequest {
            address: request.from_address.clone(),
            public_key: request.public_key.clone(),
            signature: request.signature.clone(),
        };
        self.post("v1/airdrop", &body).await
    }

    /// Submit a signed transfer request.
    pub async fn transfer(
        &self,
        request: &SignedRequest,
    ) -> Result<TransferResponse, RelayClientError> {
        let to = request
            .to_address
            .clone()
            .ok_or(RelayClientError::IncompleteRequest("to"))?;
        let amount = request
            .amount
            .clone()
            .ok_or(RelayClientError::IncompleteRequest("amount"))?;
        let body = TransferRequest {
            from: request.from_address.clone(),
            to,
            amount,
            signature: request.signature.clone(),
            public_key: request.public_key.clone(),
        };
        self.post("v1/transfer", &body).await
    }

    /// Force an authoritative balance re-read on the relay.
    pub async fn sync_balance(&self, address: &str) -> Result<BalanceResponse, RelayClientError> {
        let body = SyncBalanceRequest {
            address: address.to_string(),
        };
        self.post("v1/balance/sync", &body).await
    }

    /// Read the relay's cached balance. Cheap; never hits the ledger.
    pub async fn cached_balance(
        &self,
        address: &str,
    ) -> Result<CachedBalanceResponse, RelayClientError> {
        let url = self.base.join(&format!("v1/balance/{address}"))?;
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RelayClientError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.base.join(path)?;
        let response = self.http.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RelayClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let (kind, message) = match response.json::<ErrorResponse>().await {
            Ok(envelope) => (envelope.error, envelope.message),
            Err(_) => ("unknown".to_string(), status.to_string()),
        };
        Err(RelayClientError::Rejected {
            status: status.as_u16(),
            kind,
            message,
        })
    }
}
