//! Service health endpoint used for readiness checks and tests.

use crate::import::ImportPipeline;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

/// Basic response payload describing API health.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    /// `ok` when the history store answers, `degraded` otherwise.
    pub status: String,
    /// Number of recorded import runs, when the store is reachable.
    #[serde(rename = "importRuns")]
    pub import_runs: Option<i64>,
}

/// Health check that also probes the import history store.
#[openapi(tag = "Health")]
#[get("/health")]
pub async fn health_check(pipeline: &State<ImportPipeline>) -> Json<HealthResponse> {
    match pipeline.history_count().await {
        Ok(count) => Json(HealthResponse {
            status: "ok".to_string(),
            import_runs: Some(count),
        }),
        Err(err) => {
            log::warn!("health check could not reach history store: {}", err);
            Json(HealthResponse {
                status: "degraded".to_string(),
                import_runs: None,
            })
        }
    }
}
