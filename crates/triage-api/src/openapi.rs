//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Emergency Patient Validation API",
        version = "0.1.0",
        description = "Validates emergency patient intake records against a fixed rule table and returns the normalized record or every violation.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(crate::routes::validation::validate_emergency_patient),
    components(schemas(
        crate::routes::validation::ValidationSuccess,
        crate::error::ValidationErrors,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "validation", description = "Record validation"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
