// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer endpoint: move tokens between addresses on a verified request.

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::{
    auth::RelayVerifier,
    crypto::{address, message},
    error::ApiError,
    ledger::{parse_amount, LedgerGateway},
    models::{TransferRequest, TransferResponse},
    state::AppState,
};

/// Transfer tokens from the signer's address to a recipient.
///
/// The signature covers the recipient and the amount, so neither can be
/// altered in flight. The transfer executes through the relay's operator
/// allowance on the token contract.
#[utoipa::path(
    post,
    path = "/v1/transfer",
    tag = "Relay",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer confirmed", body = TransferResponse),
        (status = 400, description = "Malformed key, address, or amount"),
        (status = 403, description = "Address mismatch or invalid signature"),
        (status = 409, description = "Address already bound to a different key"),
        (status = 502, description = "Transfer transaction reverted"),
        (status = 503, description = "Ledger unavailable"),
        (status = 504, description = "Confirmation timed out, outcome unknown")
    )
)]
pub async fn transfer<L: LedgerGateway>(
    State(state): State<AppState<L>>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    if !address::is_well_formed(&request.from) {
        return Err(ApiError::invalid_address(format!(
            "bad sender address: {}",
            request.from
        )));
    }
    if !address::is_well_formed(&request.to) {
        return Err(ApiError::invalid_address(format!(
            "bad recipient address: {}",
            request.to
        )));
    }

    let canonical = message::transfer_message(&request.to, &request.amount);
    RelayVerifier::new(&state.accounts).authorize(
        &request.from,
        &request.public_key,
        &request.signature,
        &canonical,
    )?;

    let decimals = state.ledger.decimals().await?;
    let amount = parse_amount(&request.amount, decimals)?;
    if amount.is_zero() {
        return Err(ApiError::invalid_amount("amount must be positive"));
    }

    let pending = state
        .ledger
        .transfer_from(&request.from, &request.to, amount)
        .await?;
    let confirmed = state.ledger.await_confirmation(&pending).await?;
    if !confirmed.success {
        return Err(ApiError::transaction_failed(format!(
            "transfer reverted: {}",
            confirmed.tx_hash
        )));
    }

    // The transfer is already final; cache reconciliation failures must not
    // turn a confirmed write into a client-visible error.
    if let Err(e) = state
        .balances
        .refresh(state.ledger.as_ref(), &request.from)
        .await
    {
        warn!(address = %request.from, error = %e, "post-transfer sender refresh failed");
    }
    match state.accounts.get(&request.to) {
        Ok(Some(_)) => {
            if let Err(e) = state
                .balances
                .refresh(state.ledger.as_ref(), &request.to)
                .await
            {
                warn!(address = %request.to, error = %e, "post-transfer recipient refresh failed");
            }
        }
        // Unregistered recipients have no record to reconcile.
        Ok(None) => {}
        Err(e) => warn!(address = %request.to, error = %e, "recipient lookup failed"),
    }

    info!(
        from = %request.from,
        to = %request.to,
        amount = %request.amount,
        tx_hash = %confirmed.tx_hash,
        "transfer confirmed"
    );
    Ok(Json(TransferResponse {
        success: true,
        tx_hash: confirmed.tx_hash,
    }))
}
