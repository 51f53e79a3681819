// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance endpoints: authoritative sync and cheap cached reads.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    crypto::address,
    error::ApiError,
    ledger::LedgerGateway,
    models::{BalanceResponse, CachedBalanceResponse, SyncBalanceRequest},
    state::AppState,
};

/// Force an authoritative balance re-read from the ledger.
///
/// Persists the observation and returns the fresh value. A ledger failure is
/// a retryable 503, never a silently served stale value.
#[utoipa::path(
    post,
    path = "/v1/balance/sync",
    tag = "Relay",
    request_body = SyncBalanceRequest,
    responses(
        (status = 200, description = "Balance refreshed from the ledger", body = BalanceResponse),
        (status = 400, description = "Malformed address"),
        (status = 404, description = "Address not registered"),
        (status = 503, description = "Ledger unavailable")
    )
)]
pub async fn sync_balance<L: LedgerGateway>(
    State(state): State<AppState<L>>,
    Json(request): Json<SyncBalanceRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    if !address::is_well_formed(&request.address) {
        return Err(ApiError::invalid_address(format!(
            "not a 0x-prefixed 40-hex address: {}",
            request.address
        )));
    }

    let balance = state
        .balances
        .refresh(state.ledger.as_ref(), &request.address)
        .await?;
    Ok(Json(BalanceResponse {
        success: true,
        balance,
    }))
}

/// Read the last observed balance without touching the ledger.
///
/// The fast path device pollers use. `balance` is absent when the address
/// has never been observed.
#[utoipa::path(
    get,
    path = "/v1/balance/{address}",
    tag = "Relay",
    params(
        ("address" = String, Path, description = "0x-prefixed address")
    ),
    responses(
        (status = 200, description = "Cached balance, possibly absent", body = CachedBalanceResponse),
        (status = 400, description = "Malformed address")
    )
)]
pub async fn cached_balance<L: LedgerGateway>(
    State(state): State<AppState<L>>,
    Path(address): Path<String>,
) -> Result<Json<CachedBalanceResponse>, ApiError> {
    if !address::is_well_formed(&address) {
        return Err(ApiError::invalid_address(format!(
            "not a 0x-prefixed 40-hex address: {address}"
        )));
    }

    let cached = state.balances.get(&address)?;
    let (balance, last_updated) = match cached {
        Some(entry) => (Some(entry.balance), Some(entry.last_updated)),
        None => (None, None),
    };
    Ok(Json(CachedBalanceResponse {
        address: address.to_lowercase(),
        balance,
        last_updated,
    }))
}
