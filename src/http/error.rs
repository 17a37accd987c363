//! Relay error → HTTP response mapping.
//!
//! - Validation, malformed body → 400
//! - TransactionFailed, CommitFailed, RevealFailed → 422 with the chain message
//! - TransactionTimeout → 202 with `status: "expired"` and the transaction id
//! - Network → 502
//! - Everything else → 500

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::RelayError;

#[derive(Debug)]
pub enum ApiError {
    Relay(RelayError),
    Body(JsonRejection),
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::Body(e)
    }
}

pub fn status_for(error: &RelayError) -> StatusCode {
    match error {
        RelayError::Validation(_) => StatusCode::BAD_REQUEST,
        RelayError::TransactionFailed { .. } | RelayError::CommitFailed { .. } | RelayError::RevealFailed { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RelayError::TransactionTimeout { .. } => StatusCode::ACCEPTED,
        RelayError::Network(_) => StatusCode::BAD_GATEWAY,
        RelayError::Configuration(_)
        | RelayError::Signing(_)
        | RelayError::Parse { .. }
        | RelayError::RandomUnavailable { .. }
        | RelayError::ConfirmationDelay { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            Self::Body(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"success": false, "error": rejection.body_text()})),
                )
                    .into_response();
            }
            Self::Relay(error) => error,
        };

        let status = status_for(&error);
        let mut body = json!({
            "success": false,
            "error": error.to_string(),
        });
        if let Some(transaction_id) = error.transaction_id() {
            body["transactionId"] = json!(transaction_id);
        }
        if let Some(message) = error.chain_message() {
            body["errorMessage"] = json!(message);
        }
        if let RelayError::TransactionTimeout { .. } = error {
            body["status"] = json!("expired");
        }

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %error, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %error, "Request rejected");
        }
        (status, Json(body)).into_response()
    }
}
