// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP error envelope.
//!
//! Every subsystem error funnels into [`ApiError`], which renders as the
//! uniform `{"success":false,"error":"<kind>","message":"..."}` body. The
//! `error` kind is stable and machine-readable; the message is for humans.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::AuthError;
use crate::cache::CacheError;
use crate::ledger::LedgerError;
use crate::models::ErrorResponse;
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn malformed_key(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "malformed_key", message)
    }

    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_address_format", message)
    }

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_amount", message)
    }

    pub fn address_mismatch() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "address_mismatch",
            "claimed address does not match the supplied public key",
        )
    }

    pub fn signature_invalid() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "signature_invalid",
            "signature verification failed",
        )
    }

    pub fn key_rotation_not_allowed() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            "key_rotation_not_allowed",
            "address is already registered with a different key",
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn ledger_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "ledger_unavailable", message)
    }

    pub fn transaction_failed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "transaction_failed", message)
    }

    pub fn confirmation_timeout(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            "confirmation_timeout",
            message,
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            success: false,
            error: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MalformedKey(detail) => Self::malformed_key(detail),
            AuthError::AddressMismatch => Self::address_mismatch(),
            AuthError::SignatureInvalid => Self::signature_invalid(),
            AuthError::KeyRotationNotAllowed => Self::key_rotation_not_allowed(),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InvalidAddress(detail) => Self::invalid_address(detail),
            LedgerError::InvalidAmount(detail) => Self::invalid_amount(detail),
            LedgerError::TransactionFailed(detail) => Self::transaction_failed(detail),
            LedgerError::ConfirmationTimeout(_) => Self::confirmation_timeout(e.to_string()),
            LedgerError::Unavailable(detail) => Self::ledger_unavailable(detail),
            // Misconfiguration, not a client problem.
            LedgerError::InvalidRpcUrl(_) | LedgerError::InvalidRelayKey(_) => {
                Self::internal(e.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(address) => {
                Self::not_found(format!("address not registered: {address}"))
            }
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::Ledger(e) => e.into(),
            CacheError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn taxonomy_maps_to_statuses() {
        assert_eq!(ApiError::malformed_key("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::address_mismatch().status, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::signature_invalid().status, StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::key_rotation_not_allowed().status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::ledger_unavailable("x").status,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::confirmation_timeout("x").status,
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[tokio::test]
    async fn envelope_shape() {
        let response = ApiError::address_mismatch().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "address_mismatch");
        assert!(body["message"].is_string());
    }

    #[test]
    fn subsystem_errors_convert() {
        use std::time::Duration;

        let e: ApiError = AuthError::AddressMismatch.into();
        assert_eq!(e.kind, "address_mismatch");

        let e: ApiError = LedgerError::ConfirmationTimeout(Duration::from_secs(45)).into();
        assert_eq!(e.status, StatusCode::GATEWAY_TIMEOUT);

        let e: ApiError = StoreError::NotFound("0xabc".into()).into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);
    }
}
