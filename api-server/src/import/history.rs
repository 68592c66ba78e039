//! Audit trail of import attempts.
//!
//! Every pipeline run that gets past input checks produces exactly one
//! [`ImportHistory`] row, whatever the outcome. Entries are never updated and
//! are not tied to the organizations they describe, so deleting an
//! organization leaves its history intact.

use crate::import::error::{ImportError, ImportResult};
use crate::import::outcome::{ImportOutcome, ImportStatus};
use crate::import::store::HistoryStore;
use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportHistory {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub status: ImportStatus,
    pub imported_count: i32,
    pub error_message: Option<String>,
}

/// An entry about to be written; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImportHistory {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub status: ImportStatus,
    pub imported_count: i32,
    pub error_message: Option<String>,
}

impl NewImportHistory {
    pub fn from_outcome(username: &str, outcome: &ImportOutcome, created_at: DateTime<Utc>) -> Self {
        Self {
            username: username.trim().to_string(),
            created_at,
            status: outcome.status,
            imported_count: i32::try_from(outcome.imported_count).unwrap_or(i32::MAX),
            error_message: outcome.error_message.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ImportHistoryRecorder {
    store: Arc<dyn HistoryStore>,
}

impl ImportHistoryRecorder {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Persist the entry for a finished run.
    ///
    /// A failure here is fatal for the run: without the entry the audit
    /// guarantee cannot be met, so the error goes back to the caller.
    pub async fn record(&self, username: &str, outcome: &ImportOutcome) -> ImportResult<ImportHistory> {
        let entry = NewImportHistory::from_outcome(username, outcome, Utc::now());

        match self.store.insert(entry).await {
            Ok(history) => {
                log::info!(
                    "recorded import history {} for '{}': {} ({} imported)",
                    history.id,
                    history.username,
                    history.status,
                    history.imported_count
                );
                Ok(history)
            }
            Err(err) => {
                log::error!("failed to record import history for '{}': {}", username, err);
                Err(ImportError::HistoryWrite(err))
            }
        }
    }
}
