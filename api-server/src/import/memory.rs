//! In-memory implementation of both import stores.
//!
//! Enforces the same uniqueness rules as the database schema and can be told
//! to fail reads or writes, which lets the pipeline's failure handling be
//! exercised without Postgres.

use crate::import::history::{ImportHistory, NewImportHistory};
use crate::import::store::{
    HistoryStore, NewOrganization, Organization, OrganizationStore, StorageError, StorageResult,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    organizations: Vec<Organization>,
    history: Vec<ImportHistory>,
    next_organization_id: i64,
    next_history_id: i64,
    failing_names: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    fail_reads: AtomicBool,
    fail_history_writes: AtomicBool,
    read_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every existence lookup return [`StorageError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every history insert return [`StorageError::Unavailable`].
    pub fn fail_history_writes(&self, fail: bool) {
        self.fail_history_writes.store(fail, Ordering::SeqCst);
    }

    /// Make inserts of the organization with this name fail.
    pub async fn fail_writes_for(&self, name: &str) {
        self.state.write().await.failing_names.insert(name.to_string());
    }

    /// Number of existence lookups that reached the store.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub async fn organizations(&self) -> Vec<Organization> {
        self.state.read().await.organizations.clone()
    }

    pub async fn history_entries(&self) -> Vec<ImportHistory> {
        self.state.read().await.history.clone()
    }

    pub async fn insert_organization(&self, organization: NewOrganization) -> StorageResult<Organization> {
        OrganizationStore::insert(self, organization).await
    }

    pub async fn remove_organization(&self, name: &str) -> bool {
        let mut state = self.state.write().await;
        let before = state.organizations.len();
        state.organizations.retain(|o| o.name != name);
        state.organizations.len() != before
    }

    async fn lookup(&self, predicate: impl Fn(&Organization) -> bool) -> StorageResult<bool> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.state.read().await.organizations.iter().any(predicate))
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn exists_by_name(&self, name: &str) -> StorageResult<bool> {
        self.lookup(|o| o.name == name).await
    }

    async fn exists_by_zip_code(&self, zip_code: &str) -> StorageResult<bool> {
        self.lookup(|o| o.zip_code == zip_code).await
    }

    async fn exists_by_rating(&self, rating: f64) -> StorageResult<bool> {
        self.lookup(|o| o.rating == rating).await
    }

    async fn insert(&self, organization: NewOrganization) -> StorageResult<Organization> {
        let mut state = self.state.write().await;

        if state.failing_names.contains(&organization.name) {
            return Err(StorageError::Unavailable(format!(
                "writes disabled for '{}'",
                organization.name
            )));
        }
        if state.organizations.iter().any(|o| o.name == organization.name) {
            return Err(StorageError::UniqueViolation {
                constraint: "organizations_name_key".to_string(),
            });
        }
        if state.organizations.iter().any(|o| o.zip_code == organization.zip_code) {
            return Err(StorageError::UniqueViolation {
                constraint: "addresses_zip_code_key".to_string(),
            });
        }

        state.next_organization_id += 1;
        let id = state.next_organization_id;
        let stored = Organization {
            id,
            name: organization.name,
            full_name: organization.full_name,
            rating: organization.rating,
            annual_turnover: organization.annual_turnover,
            employees_count: organization.employees_count,
            organization_type: organization.organization_type,
            address_id: id,
            street: organization.street,
            zip_code: organization.zip_code,
            created_at: Utc::now(),
        };
        state.organizations.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn insert(&self, entry: NewImportHistory) -> StorageResult<ImportHistory> {
        if self.fail_history_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("history writes disabled".to_string()));
        }

        let mut state = self.state.write().await;
        state.next_history_id += 1;
        let history = ImportHistory {
            id: state.next_history_id,
            username: entry.username,
            created_at: entry.created_at,
            status: entry.status,
            imported_count: entry.imported_count,
            error_message: entry.error_message,
        };
        state.history.push(history.clone());
        Ok(history)
    }

    async fn list(&self, limit: i64, offset: i64) -> StorageResult<Vec<ImportHistory>> {
        let state = self.state.read().await;
        let mut entries = state.history.clone();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn get(&self, id: i64) -> StorageResult<Option<ImportHistory>> {
        let state = self.state.read().await;
        Ok(state.history.iter().find(|h| h.id == id).cloned())
    }

    async fn count(&self) -> StorageResult<i64> {
        Ok(self.state.read().await.history.len() as i64)
    }
}
