//! Best-effort persistence of accepted records.
//!
//! Records are written one at a time in plan order. A failed write is recorded
//! and the executor moves on; earlier writes stay committed and nothing is
//! retried. Unique violations at this point mean a concurrent import claimed
//! the same key after validation, and are handled like any other failed write.

use crate::import::candidate::CandidateRecord;
use crate::import::outcome::Rejection;
use crate::import::store::{NewOrganization, Organization, OrganizationStore, StorageError};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub persisted: Vec<Organization>,
    pub failures: Vec<Rejection>,
}

impl ExecutionReport {
    pub fn imported(&self) -> usize {
        self.persisted.len()
    }
}

#[derive(Clone)]
pub struct ImportExecutor {
    store: Arc<dyn OrganizationStore>,
}

impl ImportExecutor {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, accepted: &[CandidateRecord]) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for (position, candidate) in accepted.iter().enumerate() {
            let name = candidate.display_name(position);

            let Some(organization) = NewOrganization::from_candidate(candidate) else {
                log::error!("accepted record '{}' is missing required fields", name);
                report.failures.push(Rejection::new(
                    name,
                    vec!["record is incomplete".to_string()],
                ));
                continue;
            };

            match self.store.insert(organization).await {
                Ok(persisted) => {
                    log::trace!("persisted organization {} ({})", persisted.id, persisted.name);
                    report.persisted.push(persisted);
                }
                Err(err) => {
                    log::warn!("failed to persist organization '{}': {}", name, err);
                    report.failures.push(Rejection::new(name, vec![describe_write_error(&err)]));
                }
            }
        }

        report
    }
}

fn describe_write_error(err: &StorageError) -> String {
    match err {
        StorageError::UniqueViolation { constraint } => {
            format!("already exists (constraint {constraint})")
        }
        other => format!("could not be saved: {other}"),
    }
}
