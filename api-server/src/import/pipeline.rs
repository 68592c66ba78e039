//! One import run from uploaded records to a recorded history entry.
//!
//! A run moves through `Received → Validating → Planning → Executing →
//! Recording → Done`. Input errors (blank username, empty or oversized batch)
//! stop it in `Received` without touching storage. Past that point rejected
//! records and failed writes only shape the outcome; the run always reaches
//! `Recording`, and only a failure to write the history entry is returned as
//! an error.

use crate::config::ImportConfig;
use crate::import::candidate::{CandidateRecord, parse_payload};
use crate::import::error::{ImportError, ImportResult};
use crate::import::executor::ImportExecutor;
use crate::import::history::{ImportHistory, ImportHistoryRecorder};
use crate::import::outcome::ImportOutcome;
use crate::import::planner;
use crate::import::store::{HistoryStore, OrganizationStore, StorageResult};
use crate::import::uniqueness::UniquenessChecker;
use crate::import::validator::{BatchKeys, RecordValidator};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validating,
    Planning,
    Executing,
    Recording,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Validating => "validating",
            PipelineStage::Planning => "planning",
            PipelineStage::Executing => "executing",
            PipelineStage::Recording => "recording",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

struct RunProgress<'a> {
    username: &'a str,
    stage: PipelineStage,
}

impl<'a> RunProgress<'a> {
    fn new(username: &'a str) -> Self {
        Self {
            username,
            stage: PipelineStage::Received,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        log::debug!("import by '{}': {} -> {}", self.username, self.stage, next);
        self.stage = next;
    }
}

/// Runs organization imports against the configured stores.
///
/// Cheap to clone; every clone shares the same stores.
#[derive(Clone)]
pub struct ImportPipeline {
    validator: RecordValidator,
    executor: ImportExecutor,
    recorder: ImportHistoryRecorder,
    history: Arc<dyn HistoryStore>,
    config: ImportConfig,
}

impl ImportPipeline {
    pub fn new(
        organizations: Arc<dyn OrganizationStore>,
        history: Arc<dyn HistoryStore>,
        config: ImportConfig,
    ) -> Self {
        let checker = UniquenessChecker::new(organizations.clone());
        Self {
            validator: RecordValidator::new(checker, config.unique_rating),
            executor: ImportExecutor::new(organizations),
            recorder: ImportHistoryRecorder::new(history.clone()),
            history,
            config,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Decode an uploaded file and import its organizations.
    pub async fn run_payload(&self, payload: &[u8], username: &str) -> ImportResult<ImportHistory> {
        ensure_username(username)?;
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Err(ImportError::EmptyPayload);
        }
        let candidates = parse_payload(payload)?;
        self.run(candidates, username).await
    }

    /// Import a batch on behalf of `username` and return its history entry.
    pub async fn run(&self, candidates: Vec<CandidateRecord>, username: &str) -> ImportResult<ImportHistory> {
        ensure_username(username)?;
        if candidates.is_empty() {
            return Err(ImportError::EmptyBatch);
        }
        if candidates.len() > self.config.max_batch_size {
            return Err(ImportError::BatchTooLarge {
                size: candidates.len(),
                limit: self.config.max_batch_size,
            });
        }

        let started = Instant::now();
        let total = candidates.len();
        let mut progress = RunProgress::new(username);
        log::info!("import of {} organizations started by '{}'", total, username);

        progress.advance(PipelineStage::Validating);
        let mut batch = BatchKeys::new();
        let mut verdicts = Vec::with_capacity(total);
        for candidate in &candidates {
            let verdict = self.validator.validate(candidate, &batch).await;
            if verdict.is_accepted() {
                batch.admit(candidate);
            }
            verdicts.push(verdict);
        }

        progress.advance(PipelineStage::Planning);
        let plan = planner::plan(candidates, verdicts);
        log::debug!(
            "import plan: {} accepted, {} rejected, expecting {}",
            plan.accepted.len(),
            plan.rejections.len(),
            plan.status()
        );

        progress.advance(PipelineStage::Executing);
        let report = self.executor.execute(&plan.accepted).await;

        let mut rejections = plan.rejections;
        rejections.extend(report.failures.iter().cloned());
        let outcome = ImportOutcome::settle(
            total,
            report.imported(),
            &rejections,
            self.config.error_message_limit,
        );

        progress.advance(PipelineStage::Recording);
        let history = self.recorder.record(username, &outcome).await?;

        progress.advance(PipelineStage::Done);
        log::info!(
            "import by '{}' finished: {} ({} of {} imported) in {:.2}ms",
            username,
            outcome.status,
            outcome.imported_count,
            total,
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(history)
    }

    /// History entries, newest first.
    pub async fn history(&self, limit: i64, offset: i64) -> StorageResult<Vec<ImportHistory>> {
        self.history.list(limit, offset).await
    }

    pub async fn history_entry(&self, id: i64) -> StorageResult<Option<ImportHistory>> {
        self.history.get(id).await
    }

    pub async fn history_count(&self) -> StorageResult<i64> {
        self.history.count().await
    }
}

fn ensure_username(username: &str) -> ImportResult<()> {
    if username.trim().is_empty() {
        return Err(ImportError::BlankUsername);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::candidate::CandidateAddress;
    use crate::import::memory::MemoryStore;
    use crate::import::outcome::ImportStatus;

    fn candidate(name: &str, zip: &str) -> CandidateRecord {
        CandidateRecord {
            name: Some(name.to_string()),
            rating: Some(4.2),
            address: Some(CandidateAddress {
                street: Some("Main St".to_string()),
                zip_code: Some(zip.to_string()),
            }),
            ..Default::default()
        }
    }

    fn pipeline(store: &Arc<MemoryStore>) -> ImportPipeline {
        ImportPipeline::new(store.clone(), store.clone(), ImportConfig::default())
    }

    #[tokio::test]
    async fn clean_batch_succeeds() {
        let store = Arc::new(MemoryStore::new());
        let history = pipeline(&store)
            .run(
                vec![candidate("Acme", "10001"), candidate("Globex", "20002"), candidate("Initech", "30003")],
                "alice",
            )
            .await
            .expect("import runs");

        assert_eq!(history.status, ImportStatus::Success);
        assert_eq!(history.imported_count, 3);
        assert_eq!(history.error_message, None);
        assert_eq!(store.organizations().await.len(), 3);
    }

    #[tokio::test]
    async fn repeated_import_fails_on_duplicate_and_records_both_runs() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(&store);

        let first = pipeline
            .run(vec![candidate("Acme", "10001")], "alice")
            .await
            .expect("first import");
        assert_eq!(first.status, ImportStatus::Success);
        assert_eq!(first.imported_count, 1);

        let second = pipeline
            .run(vec![candidate("Acme", "10001")], "alice")
            .await
            .expect("second import");
        assert_eq!(second.status, ImportStatus::Failed);
        assert_eq!(second.imported_count, 0);
        assert!(second.error_message.unwrap().contains("name 'Acme' already exists"));

        assert_eq!(store.history_entries().await.len(), 2);
        assert_eq!(store.organizations().await.len(), 1);
    }

    #[tokio::test]
    async fn blank_rating_gives_partial() {
        let store = Arc::new(MemoryStore::new());
        let mut unrated = candidate("Globex", "20002");
        unrated.rating = None;

        let history = pipeline(&store)
            .run(vec![candidate("Acme", "10001"), unrated, candidate("Initech", "30003")], "alice")
            .await
            .expect("import runs");

        assert_eq!(history.status, ImportStatus::Partial);
        assert_eq!(history.imported_count, 2);
        let message = history.error_message.expect("partial carries a message");
        assert!(message.contains("Globex: rating is required"), "{message}");
    }

    #[tokio::test]
    async fn duplicate_within_batch_accepts_only_first() {
        let store = Arc::new(MemoryStore::new());
        let history = pipeline(&store)
            .run(vec![candidate("Acme", "10001"), candidate("Acme", "20002")], "alice")
            .await
            .expect("import runs");

        assert_eq!(history.status, ImportStatus::Partial);
        assert_eq!(history.imported_count, 1);
        let stored = store.organizations().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].zip_code, "10001");
    }

    #[tokio::test]
    async fn duplicate_zip_within_batch_accepts_only_first() {
        let store = Arc::new(MemoryStore::new());
        let history = pipeline(&store)
            .run(vec![candidate("Acme", "10001"), candidate("Globex", "10001")], "alice")
            .await
            .expect("import runs");

        assert_eq!(history.status, ImportStatus::Partial);
        assert_eq!(history.imported_count, 1);
        let message = history.error_message.expect("partial carries a message");
        assert!(
            message.contains("Globex: zip code '10001' is repeated in this batch"),
            "{message}"
        );
        let stored = store.organizations().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Acme");
    }

    #[tokio::test]
    async fn rejected_record_does_not_reserve_its_keys() {
        let store = Arc::new(MemoryStore::new());
        let mut unrated = candidate("Acme", "10001");
        unrated.rating = None;

        let history = pipeline(&store)
            .run(vec![unrated, candidate("Acme", "10001")], "alice")
            .await
            .expect("import runs");

        assert_eq!(history.status, ImportStatus::Partial);
        assert_eq!(history.imported_count, 1);
        let message = history.error_message.expect("partial carries a message");
        assert!(message.contains("Acme: rating is required"), "{message}");
        assert!(!message.contains("repeated in this batch"), "{message}");
        let stored = store.organizations().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rating, 4.2);
    }

    #[tokio::test]
    async fn all_rejected_still_records_one_failed_entry() {
        let store = Arc::new(MemoryStore::new());
        let mut blank = candidate("", "10001");
        blank.name = Some("  ".to_string());

        let history = pipeline(&store)
            .run(vec![blank], "alice")
            .await
            .expect("import runs");

        assert_eq!(history.status, ImportStatus::Failed);
        assert_eq!(history.imported_count, 0);
        assert_eq!(store.history_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn input_errors_write_no_history() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(&store);

        let empty = pipeline.run(Vec::new(), "alice").await.unwrap_err();
        assert!(matches!(empty, ImportError::EmptyBatch));

        let anonymous = pipeline.run(vec![candidate("Acme", "10001")], "   ").await.unwrap_err();
        assert!(matches!(anonymous, ImportError::BlankUsername));

        let blank_file = pipeline.run_payload(b"  \n", "alice").await.unwrap_err();
        assert!(matches!(blank_file, ImportError::EmptyPayload));

        let no_records = pipeline.run_payload(b"[]", "alice").await.unwrap_err();
        assert!(matches!(no_records, ImportError::EmptyBatch));

        let garbled = pipeline.run_payload(b"not json", "alice").await.unwrap_err();
        assert!(matches!(garbled, ImportError::MalformedPayload(_)));

        assert!(store.history_entries().await.is_empty());
    }

    #[tokio::test]
    async fn oversized_batch_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let config = ImportConfig {
            max_batch_size: 1,
            ..ImportConfig::default()
        };
        let pipeline = ImportPipeline::new(store.clone(), store.clone(), config);

        let err = pipeline
            .run(vec![candidate("Acme", "10001"), candidate("Globex", "20002")], "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::BatchTooLarge { size: 2, limit: 1 }));
        assert!(store.history_entries().await.is_empty());
    }

    #[tokio::test]
    async fn write_failure_downgrades_to_partial() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes_for("Globex").await;

        let history = pipeline(&store)
            .run(vec![candidate("Acme", "10001"), candidate("Globex", "20002")], "alice")
            .await
            .expect("import runs");

        assert_eq!(history.status, ImportStatus::Partial);
        assert_eq!(history.imported_count, 1);
        assert!(history.error_message.unwrap().contains("Globex: could not be saved"));
    }

    #[tokio::test]
    async fn fail_open_duplicate_is_caught_at_write_time() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(&store);
        pipeline
            .run(vec![candidate("Acme", "10001")], "alice")
            .await
            .expect("seed import");

        store.fail_reads(true);
        let history = pipeline
            .run(vec![candidate("Acme", "10001")], "bob")
            .await
            .expect("import runs");

        assert_eq!(history.status, ImportStatus::Failed);
        assert_eq!(history.imported_count, 0);
        assert!(history.error_message.unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn history_write_failure_is_returned() {
        let store = Arc::new(MemoryStore::new());
        store.fail_history_writes(true);

        let err = pipeline(&store)
            .run(vec![candidate("Acme", "10001")], "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::HistoryWrite(_)));
    }

    #[tokio::test]
    async fn history_survives_organization_removal_and_lists_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(&store);
        let first = pipeline
            .run(vec![candidate("Acme", "10001")], "alice")
            .await
            .expect("first import");
        let second = pipeline
            .run(vec![candidate("Globex", "20002")], "bob")
            .await
            .expect("second import");

        assert!(store.remove_organization("Acme").await);

        let listed = pipeline.history(10, 0).await.expect("history lists");
        let ids: Vec<_> = listed.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(pipeline.history_count().await.expect("count"), 2);
        assert_eq!(
            pipeline.history_entry(first.id).await.expect("lookup"),
            Some(first)
        );
    }
}
