// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URL` | EVM JSON-RPC endpoint | `https://sepolia.base.org` |
//! | `TOKEN_ADDRESS` | Token contract address | `0x531aa0c02ee61bfdaf2077356293f2550a969142` |
//! | `RELAY_PRIVATE_KEY` | Relay admin signing key (hex) | Required |
//! | `DATA_DIR` | Root directory for the account registry | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AIRDROP_AMOUNT` | Tokens minted per airdrop | `100` |
//! | `CONFIRMATION_TIMEOUT_SECS` | Receipt wait bound | `45` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

pub const RPC_URL_ENV: &str = "RPC_URL";
pub const TOKEN_ADDRESS_ENV: &str = "TOKEN_ADDRESS";
pub const RELAY_PRIVATE_KEY_ENV: &str = "RELAY_PRIVATE_KEY";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AIRDROP_AMOUNT_ENV: &str = "AIRDROP_AMOUNT";
pub const CONFIRMATION_TIMEOUT_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_RPC_URL: &str = "https://sepolia.base.org";
const DEFAULT_TOKEN_ADDRESS: &str = "0x531aa0c02ee61bfdaf2077356293f2550a969142";
const DEFAULT_DATA_DIR: &str = "/data";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_AIRDROP_AMOUNT: &str = "100";
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 45;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Resolved relay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub token_address: String,
    pub relay_private_key: String,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Decimal token amount minted per airdrop request.
    pub airdrop_amount: String,
    pub confirmation_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let relay_private_key = std::env::var(RELAY_PRIVATE_KEY_ENV)
            .map_err(|_| ConfigError::Missing(RELAY_PRIVATE_KEY_ENV))?;

        let port = match std::env::var(PORT_ENV) {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid(PORT_ENV, e.to_string()))?,
            Err(_) => DEFAULT_PORT,
        };

        let confirmation_timeout = match std::env::var(CONFIRMATION_TIMEOUT_ENV) {
            Ok(value) => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|e| ConfigError::Invalid(CONFIRMATION_TIMEOUT_ENV, e.to_string()))?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
        };

        Ok(Self {
            rpc_url: env_or_default(RPC_URL_ENV, DEFAULT_RPC_URL),
            token_address: env_or_default(TOKEN_ADDRESS_ENV, DEFAULT_TOKEN_ADDRESS),
            relay_private_key,
            data_dir: PathBuf::from(env_or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR)),
            host: env_or_default(HOST_ENV, DEFAULT_HOST),
            port,
            airdrop_amount: env_or_default(AIRDROP_AMOUNT_ENV, DEFAULT_AIRDROP_AMOUNT),
            confirmation_timeout,
        })
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
