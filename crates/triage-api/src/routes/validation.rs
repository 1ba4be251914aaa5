//! # Emergency Patient Validation
//!
//! Routes:
//! - POST /api/validate/emergency-patient: validate one intake record
//!
//! The handler is a thin adapter: parse the body, hand it to the
//! validator, translate the outcome. All rules live in `triage-core`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use triage_core::{NormalizedRecord, ValidationResult};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Message returned alongside a valid record.
pub const VALID_MESSAGE: &str = "Data is valid";

/// Body of a `200` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationSuccess {
    /// Always "Data is valid".
    pub message: String,
    /// The normalized record, fields in schema order.
    #[schema(value_type = Object)]
    pub data: NormalizedRecord,
}

/// Build the validation router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/validate/emergency-patient",
        post(validate_emergency_patient),
    )
}

/// POST /api/validate/emergency-patient: Validate an emergency patient record.
///
/// The body is a JSON object with the intake fields. Keys the schema does
/// not declare are stripped or rejected depending on configuration.
#[utoipa::path(
    post,
    path = "/api/validate/emergency-patient",
    responses(
        (status = 200, description = "Record is valid", body = ValidationSuccess),
        (status = 400, description = "Record violates one or more rules", body = crate::error::ValidationErrors),
        (status = 503, description = "Patient registry unavailable", body = crate::error::ErrorBody),
        (status = 504, description = "Patient registry timed out", body = crate::error::ErrorBody),
    ),
    tag = "validation"
)]
pub(crate) async fn validate_emergency_patient(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ValidationSuccess>, AppError> {
    let candidate = extract_json(body)?;

    match state.validator.validate_value(&candidate).await? {
        ValidationResult::Valid(data) => {
            tracing::info!(fields = data.len(), "emergency patient record accepted");
            Ok(Json(ValidationSuccess {
                message: VALID_MESSAGE.to_string(),
                data,
            }))
        }
        ValidationResult::Invalid(violations) => Err(AppError::Invalid(violations)),
    }
}
