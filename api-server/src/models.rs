use crate::import::ImportHistory;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

// ===== Response Envelopes =====

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub size: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

// ===== Import Responses =====

/// Result of an upload: the recorded history entry plus a one-line summary
/// suitable for showing to the operator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub history: ImportHistory,
    pub message: String,
}

impl ImportResponse {
    pub fn from_history(history: ImportHistory) -> Self {
        let message = match &history.error_message {
            None => format!("Successfully imported {} organizations", history.imported_count),
            Some(error) => format!("Import error: {}", error),
        };
        Self { history, message }
    }
}
