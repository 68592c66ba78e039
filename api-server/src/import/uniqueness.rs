//! Storage-backed uniqueness lookups.
//!
//! # Fail-open policy
//!
//! When the store cannot answer, the check reports [`UniquenessCheck::FailedOpen`]
//! and the record is treated as if no conflict exists. During a storage outage
//! this can let a duplicate through validation; the unique indexes on the
//! organization tables then reject it at write time and the executor folds that
//! into the outcome. Callers must not treat `FailedOpen` as proof of uniqueness.

use crate::import::store::{OrganizationStore, StorageResult};
use std::sync::Arc;

/// Result of asking storage whether a key is already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniquenessCheck {
    Available,
    Taken,
    /// Storage failed; no conflict is assumed.
    FailedOpen { reason: String },
}

impl UniquenessCheck {
    pub fn is_conflict(&self) -> bool {
        matches!(self, UniquenessCheck::Taken)
    }

    fn from_lookup(field: &str, value: &str, lookup: StorageResult<bool>) -> Self {
        match lookup {
            Ok(true) => UniquenessCheck::Taken,
            Ok(false) => UniquenessCheck::Available,
            Err(err) => {
                log::warn!(
                    "uniqueness check for {} '{}' failed open: {}",
                    field,
                    value,
                    err
                );
                UniquenessCheck::FailedOpen {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[derive(Clone)]
pub struct UniquenessChecker {
    store: Arc<dyn OrganizationStore>,
}

impl UniquenessChecker {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }

    /// Check an organization name. Blank names are never a conflict.
    pub async fn check_name(&self, name: &str) -> UniquenessCheck {
        if name.trim().is_empty() {
            return UniquenessCheck::Available;
        }
        let lookup = self.store.exists_by_name(name).await;
        UniquenessCheck::from_lookup("name", name, lookup)
    }

    /// Check an address zip code. Blank codes are never a conflict.
    pub async fn check_zip_code(&self, zip_code: &str) -> UniquenessCheck {
        if zip_code.trim().is_empty() {
            return UniquenessCheck::Available;
        }
        let lookup = self.store.exists_by_zip_code(zip_code).await;
        UniquenessCheck::from_lookup("zip code", zip_code, lookup)
    }

    pub async fn check_rating(&self, rating: f64) -> UniquenessCheck {
        if !rating.is_finite() {
            return UniquenessCheck::Available;
        }
        let lookup = self.store.exists_by_rating(rating).await;
        UniquenessCheck::from_lookup("rating", &rating.to_string(), lookup)
    }
}
