//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//!
//! Two response shapes:
//!
//! - Rule violations answer `400` with `{ "errors": [..] }`, the messages in
//!   rule order. These are expected outcomes and are not logged as errors.
//! - Everything else answers with the [`ErrorBody`] envelope. Registry
//!   failures map to `503`/`504` so callers never mistake an infrastructure
//!   fault for bad data; their details stay in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use triage_core::{CapabilityFailure, Violations};
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST", "REGISTRY_UNAVAILABLE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Body of a `400` validation failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrors {
    /// Violation messages in rule order.
    pub errors: Vec<String>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be parsed as JSON (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The record violated one or more rules (400).
    #[error("validation failed:\n{0}")]
    Invalid(Violations),

    /// The temporary-id registry failed or is not configured (503).
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// The temporary-id registry did not answer in time (504).
    #[error("registry timeout: {0}")]
    RegistryTimeout(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Invalid(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::RegistryUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "REGISTRY_UNAVAILABLE")
            }
            Self::RegistryTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "REGISTRY_TIMEOUT"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            Self::Invalid(violations) => {
                tracing::debug!(violations = violations.violations().len(), "validation failed");
                let body = ValidationErrors {
                    errors: violations.messages(),
                };
                return (status, Json(body)).into_response();
            }
            Self::RegistryUnavailable(_) => {
                tracing::error!(error = %self, "registry unavailable");
                "The patient registry is unavailable; the record could not be validated"
                    .to_string()
            }
            Self::RegistryTimeout(_) => {
                tracing::error!(error = %self, "registry timeout");
                "The patient registry did not respond in time; the record could not be validated"
                    .to_string()
            }
            Self::BadRequest(_) => self.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert capability failures to API errors.
impl From<CapabilityFailure> for AppError {
    fn from(err: CapabilityFailure) -> Self {
        if err.is_timeout() {
            Self::RegistryTimeout(err.to_string())
        } else {
            Self::RegistryUnavailable(err.to_string())
        }
    }
}
