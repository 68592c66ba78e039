//! Batch-level outcome of an import.

use rocket_db_pools::sqlx;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "import_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportStatus {
    Success,
    Partial,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Success => "SUCCESS",
            ImportStatus::Partial => "PARTIAL",
            ImportStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that did not make it into storage, with the reasons why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reasons: Vec<String>,
}

impl Rejection {
    pub fn new(name: impl Into<String>, reasons: Vec<String>) -> Self {
        Self {
            name: name.into(),
            reasons,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.reasons.join(", "))
    }
}

/// Aggregate result of one batch.
///
/// `imported_count` is the number of organizations actually written and
/// `error_message` is present exactly when the status is not `SUCCESS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub status: ImportStatus,
    pub imported_count: usize,
    pub error_message: Option<String>,
}

impl ImportOutcome {
    /// Derive the outcome from what happened to each of `total` candidates.
    ///
    /// `rejections` holds both validation rejections and failed writes, in
    /// input order. `message_limit` caps the length of the error message in
    /// characters.
    pub fn settle(
        total: usize,
        imported: usize,
        rejections: &[Rejection],
        message_limit: usize,
    ) -> Self {
        let status = if imported == total && rejections.is_empty() {
            ImportStatus::Success
        } else if imported == 0 {
            ImportStatus::Failed
        } else {
            ImportStatus::Partial
        };

        let error_message = match status {
            ImportStatus::Success => None,
            _ => Some(truncate_chars(
                &describe_failure(status, total, imported, rejections),
                message_limit,
            )),
        };

        Self {
            status,
            imported_count: imported,
            error_message,
        }
    }
}

fn describe_failure(
    status: ImportStatus,
    total: usize,
    imported: usize,
    rejections: &[Rejection],
) -> String {
    let headline = match status {
        ImportStatus::Failed => format!("none of {total} organizations were imported"),
        _ => format!("imported {imported} of {total} organizations"),
    };

    if rejections.is_empty() {
        return headline;
    }

    let details: Vec<String> = rejections.iter().map(ToString::to_string).collect();
    format!("{headline}; rejected: {}", details.join("; "))
}

fn truncate_chars(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(limit.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
