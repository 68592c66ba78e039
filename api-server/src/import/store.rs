//! Storage seams used by the import pipeline.
//!
//! The pipeline never talks to a database directly. It is handed an
//! [`OrganizationStore`] for uniqueness lookups and organization writes, and a
//! [`HistoryStore`] for the audit trail.

use crate::import::candidate::{CandidateRecord, OrganizationType};
use crate::import::history::{ImportHistory, NewImportHistory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// A unique constraint rejected the write, typically because a concurrent
    /// import committed the same name or zip code first.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StorageError::UniqueViolation {
                    constraint: db_err
                        .constraint()
                        .unwrap_or("unknown")
                        .to_string(),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::Unavailable(err.to_string())
            }
            _ => StorageError::Database(err),
        }
    }
}

/// A validated organization ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrganization {
    pub name: String,
    pub full_name: Option<String>,
    pub rating: f64,
    pub annual_turnover: Option<f64>,
    pub employees_count: Option<i64>,
    pub organization_type: Option<OrganizationType>,
    pub street: Option<String>,
    pub zip_code: String,
}

impl NewOrganization {
    /// Build the write model from a candidate that passed validation.
    ///
    /// Returns `None` when a field required for persistence is missing, which
    /// can only happen if the candidate skipped validation.
    pub fn from_candidate(candidate: &CandidateRecord) -> Option<Self> {
        let name = candidate.trimmed_name()?.to_string();
        let zip_code = candidate.zip_code()?.to_string();
        let rating = candidate.rating?;

        Some(Self {
            name,
            full_name: candidate.full_name.clone(),
            rating,
            annual_turnover: candidate.annual_turnover,
            employees_count: candidate.employees_count,
            organization_type: candidate.organization_type,
            street: candidate.address.as_ref().and_then(|a| a.street.clone()),
            zip_code,
        })
    }
}

/// An organization as stored, with its assigned identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub full_name: Option<String>,
    pub rating: f64,
    pub annual_turnover: Option<f64>,
    pub employees_count: Option<i64>,
    pub organization_type: Option<OrganizationType>,
    pub address_id: i64,
    pub street: Option<String>,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
}

/// Read and write access to organizations and their addresses.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn exists_by_name(&self, name: &str) -> StorageResult<bool>;

    async fn exists_by_zip_code(&self, zip_code: &str) -> StorageResult<bool>;

    async fn exists_by_rating(&self, rating: f64) -> StorageResult<bool>;

    /// Persist one organization together with its address.
    ///
    /// Implementations must enforce uniqueness of name and zip code themselves
    /// and report a clash as [`StorageError::UniqueViolation`].
    async fn insert(&self, organization: NewOrganization) -> StorageResult<Organization>;
}

/// Append-only store of import history entries.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn insert(&self, entry: NewImportHistory) -> StorageResult<ImportHistory>;

    /// Entries ordered newest first.
    async fn list(&self, limit: i64, offset: i64) -> StorageResult<Vec<ImportHistory>>;

    async fn get(&self, id: i64) -> StorageResult<Option<ImportHistory>>;

    async fn count(&self) -> StorageResult<i64>;
}
