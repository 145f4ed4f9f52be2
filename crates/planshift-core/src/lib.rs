//! Planshift Core - plan lifecycle and bulk synchronization engine
//!
//! This crate provides the core functionality for the Planshift CLI:
//! - CSV ingestion into typed production/facility records
//! - Remote store client (products, plants, optimizer)
//! - Clear-then-upload bulk sync with progress reporting
//! - Local JSON-backed plan snapshot storage
//! - Session lifecycle controller coordinating the above

pub mod config;
pub mod constants;
pub mod ingest;
pub mod model;
pub mod paths;
pub mod remote;
pub mod session;
pub mod storage;
pub mod sync;

// Re-exports for convenience
pub use config::RemoteConfig;
pub use ingest::{CsvSource, IngestError};
pub use model::{Plan, PlantRecord, ProductRecord};
pub use remote::{HttpRemoteStore, RemoteError, RemoteStore};
pub use session::{ConfirmationRequest, Decision, Outcome, SessionController, SessionError};
pub use storage::SnapshotStore;
pub use sync::{ImportResult, ProgressSink, SyncEngine};
