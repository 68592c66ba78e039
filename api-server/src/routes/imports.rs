//! Organization import endpoints: upload a file, browse the audit history.

use crate::error::ApiError;
use crate::import::{ImportHistory, ImportPipeline};
use crate::models::{DataResponse, ImportResponse, PageMeta, PagedResponse};
use crate::routes::params::PaginationParams;
use rocket::State;
use rocket::data::{ByteUnit, Data};
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// Import organizations from an uploaded JSON file.
///
/// The request body is the file itself: a JSON array of organizations.
/// Rejected records do not fail the request; the returned history entry
/// reports `PARTIAL` or `FAILED` with the reasons in `errorMessage`.
#[openapi(tag = "Imports")]
#[post("/imports?<username>", data = "<payload>")]
pub async fn upload_import(
    username: Option<String>,
    payload: Data<'_>,
    pipeline: &State<ImportPipeline>,
) -> Result<Json<DataResponse<ImportResponse>>, ApiError> {
    let username = username.unwrap_or_default();
    let limit = ByteUnit::from(pipeline.config().max_payload_bytes);

    let body = payload
        .open(limit)
        .into_bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read uploaded file: {}", e)))?;

    if !body.is_complete() {
        return Err(ApiError::PayloadTooLarge(format!(
            "Uploaded file exceeds the {} limit",
            limit
        )));
    }

    let history = pipeline.run_payload(&body.into_inner(), &username).await?;

    Ok(Json(DataResponse {
        data: ImportResponse::from_history(history),
    }))
}

/// List import history, newest first.
#[openapi(tag = "Imports")]
#[get("/imports/history?<pagination..>")]
pub async fn list_import_history(
    pagination: PaginationParams,
    pipeline: &State<ImportPipeline>,
) -> Result<Json<PagedResponse<ImportHistory>>, ApiError> {
    let default_size = pipeline.config().history_page_size as i64;
    let size = pagination.size(default_size);

    let entries = pipeline
        .history(size, pagination.offset(default_size))
        .await?;
    let total = pipeline.history_count().await?;

    Ok(Json(PagedResponse {
        data: entries,
        meta: PageMeta {
            page: pagination.page(),
            size,
            total,
        },
    }))
}

/// Get a single import history entry.
#[openapi(tag = "Imports")]
#[get("/imports/history/<id>")]
pub async fn get_import_history(
    id: i64,
    pipeline: &State<ImportPipeline>,
) -> Result<Json<DataResponse<ImportHistory>>, ApiError> {
    let entry = pipeline
        .history_entry(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Import history entry {} not found", id)))?;

    Ok(Json(DataResponse { data: entry }))
}
