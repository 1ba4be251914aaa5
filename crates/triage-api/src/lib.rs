//! # triage-api: Emergency Patient Validation Service
//!
//! Axum front end over [`triage_core::PatientRecordValidator`]. Accepts a
//! candidate intake record, answers with the normalized record or with
//! every rule violation.
//!
//! ## API Surface
//!
//! | Method | Path                               | Purpose                    |
//! |--------|------------------------------------|----------------------------|
//! | POST   | `/api/validate/emergency-patient`  | [`routes::validation`]     |
//! | GET    | `/health/liveness`                 | Liveness probe             |
//! | GET    | `/health/readiness`                | Readiness probe            |
//! | GET    | `/openapi.json`                    | [`openapi::ApiDoc`]        |
//!
//! ## Middleware Stack
//!
//! ```text
//! TraceLayer → Handler
//! ```

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::validation::router())
        .merge(openapi::router())
        .layer(middleware::tracing_layer::layer())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the schema compiles at startup, so a running
/// process is ready.
async fn readiness() -> &'static str {
    "ready"
}
