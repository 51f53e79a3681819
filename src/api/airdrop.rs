// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Airdrop endpoint: mint the configured amount to a verified device.

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    auth::RelayVerifier,
    crypto::{address, message},
    error::ApiError,
    ledger::{parse_amount, LedgerGateway},
    models::{AirdropRequest, AirdropResponse},
    state::AppState,
};

/// Request an airdrop to the claimed address.
///
/// The request must be signed by the key that derives to `address`. On first
/// use the key is pinned to the address. The response carries the confirmed
/// transaction hash and the post-mint balance.
#[utoipa::path(
    post,
    path = "/v1/airdrop",
    tag = "Relay",
    request_body = AirdropRequest,
    responses(
        (status = 200, description = "Airdrop minted and confirmed", body = AirdropResponse),
        (status = 400, description = "Malformed key or address"),
        (status = 403, description = "Address mismatch or invalid signature"),
        (status = 409, description = "Address already bound to a different key"),
        (status = 502, description = "Mint transaction reverted"),
        (status = 503, description = "Ledger unavailable"),
        (status = 504, description = "Confirmation timed out, outcome unknown")
    )
)]
pub async fn request_airdrop<L: LedgerGateway>(
    State(state): State<AppState<L>>,
    Json(request): Json<AirdropRequest>,
) -> Result<Json<AirdropResponse>, ApiError> {
    if !address::is_well_formed(&request.address) {
        return Err(ApiError::invalid_address(format!(
            "not a 0x-prefixed 40-hex address: {}",
            request.address
        )));
    }

    let canonical = message::airdrop_message(&request.address);
    RelayVerifier::new(&state.accounts).authorize(
        &request.address,
        &request.public_key,
        &request.signature,
        &canonical,
    )?;

    let decimals = state.ledger.decimals().await?;
    let amount = parse_amount(&state.settings.airdrop_amount, decimals)?;

    let pending = state.ledger.mint_to(&request.address, amount).await?;
    let confirmed = state.ledger.await_confirmation(&pending).await?;
    if !confirmed.success {
        return Err(ApiError::transaction_failed(format!(
            "mint reverted: {}",
            confirmed.tx_hash
        )));
    }

    let balance = state
        .balances
        .refresh(state.ledger.as_ref(), &request.address)
        .await?;

    info!(
        address = %request.address,
        tx_hash = %confirmed.tx_hash,
        balance = %balance,
        "airdrop confirmed"
    );
    Ok(Json(AirdropResponse {
        success: true,
        tx_hash: confirmed.tx_hash,
        balance,
    }))
}
