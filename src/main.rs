// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use dlinker::api::router;
use dlinker::config::{Config, LOG_FORMAT_ENV};
use dlinker::ledger::evm::EvmLedger;
use dlinker::state::{AppState, RelaySettings};
use dlinker::storage::AccountStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("invalid configuration");

    let accounts = Arc::new(
        AccountStore::open(&config.data_dir.join("accounts.redb"))
            .expect("failed to open account registry"),
    );

    let ledger = EvmLedger::new(
        &config.rpc_url,
        &config.token_address,
        &config.relay_private_key,
        config.confirmation_timeout,
    )
    .expect("failed to set up ledger gateway");

    let state = AppState::new(
        ledger,
        accounts,
        RelaySettings {
            airdrop_amount: config.airdrop_amount.clone(),
        },
    );
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("failed to parse bind address");

    info!(
        rpc_url = %config.rpc_url,
        token = %config.token_address,
        %addr,
        "relay listening (docs at /docs)"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .expect("server failed");
}
