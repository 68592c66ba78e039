//! Organization batch import.
//!
//! This module turns an uploaded list of organizations into persisted rows plus
//! exactly one audit entry describing the attempt:
//!
//! 1. **Parsing** (`candidate`) - Decodes the uploaded JSON array into candidate records
//! 2. **Uniqueness** (`uniqueness`) - Asks storage whether a name or zip code is taken
//! 3. **Validation** (`validator`) - Structural checks plus storage and intra-batch uniqueness
//! 4. **Planning** (`planner`) - Splits the batch into accepted records and rejections
//! 5. **Execution** (`executor`) - Best-effort persistence of the accepted records
//! 6. **Recording** (`history`) - Writes the immutable history entry
//!
//! `pipeline` wires the stages together for one invocation. Storage is reached
//! only through the traits in `store`, so the same pipeline runs against
//! Postgres (`postgres`) in production and the in-memory store (`memory`) in tests.
//!
//! # Partial success
//!
//! Imports are not transactional across the batch. Records that pass validation
//! are written one by one; a failure on one record does not undo the others.
//! The resulting status is `PARTIAL` whenever some but not all records landed.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use crate::import::{ImportPipeline, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let pipeline = ImportPipeline::new(store.clone(), store, ImportConfig::default());
//! let entry = pipeline.run_payload(payload_bytes, "operator").await?;
//! println!("{} -> {} imported", entry.status, entry.imported_count);
//! ```

pub mod candidate;
pub mod error;
pub mod executor;
pub mod history;
pub mod memory;
pub mod outcome;
pub mod pipeline;
pub mod planner;
pub mod postgres;
pub mod store;
pub mod uniqueness;
pub mod validator;

pub use candidate::{CandidateAddress, CandidateRecord, OrganizationType, parse_payload};
pub use error::ImportError;
pub use history::{ImportHistory, ImportHistoryRecorder, NewImportHistory};
pub use memory::MemoryStore;
pub use outcome::{ImportOutcome, ImportStatus};
pub use pipeline::{ImportPipeline, PipelineStage};
pub use postgres::{PgHistoryStore, PgOrganizationStore};
pub use store::{HistoryStore, NewOrganization, Organization, OrganizationStore, StorageError};
