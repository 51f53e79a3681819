// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    ledger::LedgerGateway,
    models::{
        AirdropRequest, AirdropResponse, BalanceResponse, CachedBalanceResponse, ErrorResponse,
        SyncBalanceRequest, TransferRequest, TransferResponse,
    },
    state::AppState,
};

pub mod airdrop;
pub mod balance;
pub mod health;
pub mod transfer;

pub fn router<L: LedgerGateway + 'static>(state: AppState<L>) -> Router {
    let v1_routes = Router::new()
        .route("/airdrop", post(airdrop::request_airdrop::<L>))
        .route("/transfer", post(transfer::transfer::<L>))
        .route("/balance/sync", post(balance::sync_balance::<L>))
        .route("/balance/{address}", get(balance::cached_balance::<L>))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::ready))
        .route("/health/live", get(health::live))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        airdrop::request_airdrop,
        transfer::transfer,
        balance::sync_balance,
        balance::cached_balance,
        health::ready,
        health::live
    ),
    components(
        schemas(
            AirdropRequest,
            AirdropResponse,
            TransferRequest,
            TransferResponse,
            SyncBalanceRequest,
            BalanceResponse,
            CachedBalanceResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Relay", description = "Signed device requests and balances"),
        (name = "Health", description = "Service probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use alloy::primitives::U256;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;

    use crate::device::{KeyManager, RequestSigner, SignedRequest};
    use crate::ledger::mock::MockLedger;
    use crate::state::RelaySettings;
    use crate::storage::AccountStore;

    fn relay_state(ledger: MockLedger) -> (tempfile::TempDir, AppState<MockLedger>) {
        let dir = tempfile::tempdir().unwrap();
        let accounts = Arc::new(AccountStore::open(&dir.path().join("accounts.redb")).unwrap());
        let state = AppState::new(
            ledger,
            accounts,
            RelaySettings {
                airdrop_amount: "100".to_string(),
            },
        );
        (dir, state)
    }

    fn device() -> (tempfile::TempDir, KeyManager) {
        let dir = tempfile::tempdir().unwrap();
        let keys = KeyManager::new(dir.path());
        (dir, keys)
    }

    fn airdrop_body(signed: &SignedRequest) -> AirdropRequest {
        AirdropRequest {
            address: signed.from_address.clone(),
            public_key: signed.public_key.clone(),
            signature: signed.signature.clone(),
        }
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (_dir, state) = relay_state(MockLedger::new(6));
        let app = router(state);
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn airdrop_mints_pins_and_caches() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let signed = RequestSigner::new(&keys).airdrop().unwrap();

        let Json(response) =
            airdrop::request_airdrop(State(state.clone()), Json(airdrop_body(&signed)))
                .await
                .unwrap();
        assert!(response.success);
        assert_eq!(response.balance, "100");
        assert!(response.tx_hash.starts_with("0x"));

        // First use pinned the key.
        let record = state.accounts.get(&signed.from_address).unwrap().unwrap();
        assert_eq!(record.public_key, signed.public_key);

        // The cached read works with the ledger gone.
        state.ledger.set_unavailable(true);
        let Json(cached) =
            balance::cached_balance(State(state.clone()), Path(signed.from_address.clone()))
                .await
                .unwrap();
        assert_eq!(cached.balance.as_deref(), Some("100"));
    }

    #[tokio::test]
    async fn spoofed_address_never_reaches_the_ledger() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let signed = RequestSigner::new(&keys).airdrop().unwrap();

        let mut body = airdrop_body(&signed);
        body.address = "0x0000000000000000000000000000000000000001".to_string();

        let err = airdrop::request_airdrop(State(state.clone()), Json(body))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.kind, "address_mismatch");
        assert!(state.ledger.writes().is_empty());
        assert!(state.accounts.get(&signed.from_address).unwrap().is_none());
    }

    #[tokio::test]
    async fn spoofed_transfer_sender_never_reaches_the_ledger() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let to = "0x00000000000000000000000000000000000000aa";
        let signed = RequestSigner::new(&keys).transfer(to, "10").unwrap();

        let err = transfer::transfer(
            State(state.clone()),
            Json(TransferRequest {
                // The key derives to a different address than this claim.
                from: "0x0000000000000000000000000000000000000001".to_string(),
                to: to.to_string(),
                amount: "10".to_string(),
                signature: signed.signature.clone(),
                public_key: signed.public_key.clone(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, "address_mismatch");
        assert!(state.ledger.writes().is_empty());
    }

    #[tokio::test]
    async fn rotated_key_is_rejected() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let signed = RequestSigner::new(&keys).airdrop().unwrap();

        // The address is already bound to some other key.
        state
            .accounts
            .register_or_get_key(&signed.from_address, "b3RoZXIta2V5")
            .unwrap();

        let err = airdrop::request_airdrop(State(state.clone()), Json(airdrop_body(&signed)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.kind, "key_rotation_not_allowed");
        assert!(state.ledger.writes().is_empty());
    }

    #[tokio::test]
    async fn transfer_moves_funds_and_reconciles_sender() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let signer = RequestSigner::new(&keys);

        let signed = signer.airdrop().unwrap();
        airdrop::request_airdrop(State(state.clone()), Json(airdrop_body(&signed)))
            .await
            .unwrap();

        let to = "0x00000000000000000000000000000000000000aa";
        let signed = signer.transfer(to, "40.5").unwrap();
        let Json(response) = transfer::transfer(
            State(state.clone()),
            Json(TransferRequest {
                from: signed.from_address.clone(),
                to: to.to_string(),
                amount: "40.5".to_string(),
                signature: signed.signature.clone(),
                public_key: signed.public_key.clone(),
            }),
        )
        .await
        .unwrap();
        assert!(response.success);

        assert_eq!(state.ledger.balance(to), U256::from(40_500_000u64));
        assert_eq!(
            state.ledger.balance(&signed.from_address),
            U256::from(59_500_000u64)
        );
        // Sender cache was reconciled; the unregistered recipient got no row.
        let cached = state.balances.get(&signed.from_address).unwrap().unwrap();
        assert_eq!(cached.balance, "59.5");
        assert!(state.accounts.get(to).unwrap().is_none());
    }

    #[tokio::test]
    async fn tampered_transfer_amount_is_rejected() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let signer = RequestSigner::new(&keys);

        let signed = signer.airdrop().unwrap();
        airdrop::request_airdrop(State(state.clone()), Json(airdrop_body(&signed)))
            .await
            .unwrap();
        let writes_before = state.ledger.writes().len();

        let to = "0x00000000000000000000000000000000000000aa";
        let signed = signer.transfer(to, "1").unwrap();
        let err = transfer::transfer(
            State(state.clone()),
            Json(TransferRequest {
                from: signed.from_address.clone(),
                to: to.to_string(),
                // The device signed "1"; a middleman bumped the amount.
                amount: "100".to_string(),
                signature: signed.signature.clone(),
                public_key: signed.public_key.clone(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, "signature_invalid");
        assert_eq!(state.ledger.writes().len(), writes_before);
    }

    #[tokio::test]
    async fn reverted_mint_surfaces_transaction_failed() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let signed = RequestSigner::new(&keys).airdrop().unwrap();

        state.ledger.revert_next();
        let err = airdrop::request_airdrop(State(state.clone()), Json(airdrop_body(&signed)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.kind, "transaction_failed");
    }

    #[tokio::test]
    async fn unconfirmed_mint_surfaces_unknown_outcome() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let signed = RequestSigner::new(&keys).airdrop().unwrap();

        // The transaction was submitted but never confirmed in time. The
        // outcome is unknown, which is a gateway timeout, not a failure.
        state.ledger.timeout_next();
        let err = airdrop::request_airdrop(State(state.clone()), Json(airdrop_body(&signed)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.kind, "confirmation_timeout");
    }

    #[tokio::test]
    async fn sync_balance_is_authoritative_or_fails() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let (_dd, keys) = device();
        let signed = RequestSigner::new(&keys).airdrop().unwrap();
        airdrop::request_airdrop(State(state.clone()), Json(airdrop_body(&signed)))
            .await
            .unwrap();

        let Json(response) = balance::sync_balance(
            State(state.clone()),
            Json(SyncBalanceRequest {
                address: signed.from_address.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.balance, "100");

        // With the ledger down the sync fails loudly instead of serving the
        // cached value.
        state.ledger.set_unavailable(true);
        let err = balance::sync_balance(
            State(state.clone()),
            Json(SyncBalanceRequest {
                address: signed.from_address.clone(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind, "ledger_unavailable");
    }

    #[tokio::test]
    async fn unknown_address_reads_as_empty() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let Json(response) = balance::cached_balance(
            State(state.clone()),
            Path("0x00000000000000000000000000000000000000bb".to_string()),
        )
        .await
        .unwrap();
        assert!(response.balance.is_none());
        assert!(response.last_updated.is_none());
    }

    #[tokio::test]
    async fn malformed_addresses_are_bad_requests() {
        let (_sd, state) = relay_state(MockLedger::new(6));
        let err = balance::cached_balance(State(state.clone()), Path("garbage".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.kind, "invalid_address_format");
        assert!(state.ledger.writes().is_empty());
    }
}
