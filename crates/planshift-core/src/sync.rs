//! Bulk sync orchestrator
//!
//! Drives the clear-then-upload protocol that makes the remote store's
//! contents match a plan:
//! - `clear_all` sweeps every remote record, tolerating per-delete
//!   failures
//! - `bulk_upload` folds records into an [`ImportResult`] accumulator;
//!   one bad row never halts the batch
//! - `replace_all` runs the full phase sequence with a continuous
//!   0-100 progress indicator
//!
//! Uploads are strictly sequential: records are created remotely in
//! exactly their source order, and downstream display ordering depends
//! on that.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::model::{PlantRecord, ProductRecord};
use crate::remote::{RemoteError, RemoteStore};

/// Which dataset a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Product,
    Plant,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Product => write!(f, "products"),
            RecordKind::Plant => write!(f, "plants"),
        }
    }
}

/// A record the engine knows how to push to the remote store
#[async_trait]
pub trait SyncRecord: Send + Sync {
    /// Dataset this record belongs to
    const KIND: RecordKind;

    /// Domain identity key (`product_id` / `plant_id`)
    fn identity(&self) -> &str;

    /// Map to the remote schema (substituting upload defaults) and
    /// create the record
    async fn push(&self, remote: &dyn RemoteStore) -> Result<(), RemoteError>;
}

#[async_trait]
impl SyncRecord for ProductRecord {
    const KIND: RecordKind = RecordKind::Product;

    fn identity(&self) -> &str {
        &self.product_id
    }

    async fn push(&self, remote: &dyn RemoteStore) -> Result<(), RemoteError> {
        remote.create_product(&self.payload()).await.map(|_| ())
    }
}

#[async_trait]
impl SyncRecord for PlantRecord {
    const KIND: RecordKind = RecordKind::Plant;

    fn identity(&self) -> &str {
        &self.plant_id
    }

    async fn push(&self, remote: &dyn RemoteStore) -> Result<(), RemoteError> {
        remote.create_plant(&self.payload()).await.map(|_| ())
    }
}

/// Progress band a batch occupies within an overall 0-100 indicator
///
/// Two batches can interleave into one continuous indicator, e.g.
/// products in 10-50 and plants in 50-90.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRange {
    pub start: f32,
    pub span: f32,
}

impl ProgressRange {
    pub const fn new(start: f32, span: f32) -> Self {
        Self { start, span }
    }

    /// Upper bound of the band
    pub fn end(&self) -> f32 {
        self.start + self.span
    }

    /// Percentage after `completed` of `total` records
    pub fn at(&self, completed: usize, total: usize) -> f32 {
        if total == 0 {
            return self.end();
        }
        self.start + (completed as f32 / total as f32) * self.span
    }
}

/// Progress side channel, invoked after each record
///
/// Reporting never blocks or alters upload pacing; there is no
/// backpressure.
pub trait ProgressSink {
    fn report(&mut self, percent: f32, message: &str);
}

/// Sink that discards all reports
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _percent: f32, _message: &str) {}
}

/// Adapter turning a closure into a [`ProgressSink`]
pub struct FnSink<F: FnMut(f32, &str)>(pub F);

impl<F: FnMut(f32, &str)> ProgressSink for FnSink<F> {
    fn report(&mut self, percent: f32, message: &str) {
        (self.0)(percent, message);
    }
}

/// One failed record in a bulk upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// Identity key of the record that failed
    pub key: String,
    pub message: String,
}

/// Per-batch outcome summary; reported to the caller, never persisted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<ImportFailure>,
}

/// Outcome of a [`SyncEngine::clear_all`] sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub products_deleted: usize,
    pub plants_deleted: usize,
    /// Deletes that failed; the sweep still attempted every record
    pub failed: usize,
}

/// Full report of a clear-then-upload sequence
#[derive(Debug, Clone)]
pub struct ReplaceReport {
    pub cleared: ClearSummary,
    pub products: ImportResult,
    pub plants: ImportResult,
    /// Remote `(products, plants)` counts observed during verification,
    /// when the verification reads succeeded
    pub remote_counts: Option<(usize, usize)>,
}

/// Phases of a full plan sync sequence
///
/// Each phase is entered only after the previous phase's work
/// completes; nothing runs in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Clearing,
    UploadingProducts,
    UploadingPlants,
    Verifying,
    Finalizing,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Clearing => "clearing",
            SyncPhase::UploadingProducts => "uploading_products",
            SyncPhase::UploadingPlants => "uploading_plants",
            SyncPhase::Verifying => "verifying",
            SyncPhase::Finalizing => "finalizing",
        };
        write!(f, "{name}")
    }
}

/// Progress band for the product batch
pub const PRODUCTS_RANGE: ProgressRange = ProgressRange::new(10.0, 40.0);

/// Progress band for the plant batch
pub const PLANTS_RANGE: ProgressRange = ProgressRange::new(50.0, 40.0);

/// The bulk sync orchestrator
pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    phase: SyncPhase,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            phase: SyncPhase::Idle,
        }
    }

    /// Current phase of the sequence
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    fn enter(&mut self, phase: SyncPhase) {
        info!(from = %self.phase, to = %phase, "sync phase transition");
        self.phase = phase;
    }

    /// Delete every record currently in the remote store
    ///
    /// Per-delete failures are logged and never abort the sweep; the
    /// engine attempts every delete it enumerated. Only enumeration
    /// failure (store unreachable) fails the operation.
    pub async fn clear_all(&self) -> Result<ClearSummary, RemoteError> {
        let products = self.remote.list_products().await?;
        let plants = self.remote.list_plants().await?;

        let mut summary = ClearSummary::default();

        for product in &products {
            match self.remote.delete_product(product.id).await {
                Ok(_) => summary.products_deleted += 1,
                Err(e) => {
                    warn!(id = product.id, error = %e, "product delete failed, continuing sweep");
                    summary.failed += 1;
                }
            }
        }

        for plant in &plants {
            match self.remote.delete_plant(plant.id).await {
                Ok(_) => summary.plants_deleted += 1,
                Err(e) => {
                    warn!(id = plant.id, error = %e, "plant delete failed, continuing sweep");
                    summary.failed += 1;
                }
            }
        }

        info!(
            products = summary.products_deleted,
            plants = summary.plants_deleted,
            failed = summary.failed,
            "cleared remote store"
        );
        Ok(summary)
    }

    /// Upload records strictly in input order, one at a time
    ///
    /// Folds every attempt into the returned [`ImportResult`]; a
    /// single failure never halts the batch. Progress is reported
    /// after each attempt within `range`.
    pub async fn bulk_upload<T: SyncRecord>(
        &self,
        records: &[T],
        range: ProgressRange,
        sink: &mut dyn ProgressSink,
    ) -> ImportResult {
        let total = records.len();
        let mut result = ImportResult::default();

        for record in records {
            result.attempted += 1;
            match record.push(self.remote.as_ref()).await {
                Ok(()) => result.succeeded += 1,
                Err(e) => {
                    warn!(
                        kind = %T::KIND,
                        key = record.identity(),
                        error = %e,
                        "record upload failed, continuing batch"
                    );
                    result.failed += 1;
                    result.failures.push(ImportFailure {
                        key: record.identity().to_string(),
                        message: e.to_string(),
                    });
                }
            }

            sink.report(
                range.at(result.attempted, total),
                &format!("Uploading {}: {}/{}", T::KIND, result.attempted, total),
            );
        }

        info!(
            kind = %T::KIND,
            attempted = result.attempted,
            succeeded = result.succeeded,
            failed = result.failed,
            "bulk upload finished"
        );
        result
    }

    /// Run the full clear-then-upload sequence
    ///
    /// `Idle → Clearing → UploadingProducts → UploadingPlants →
    /// Verifying → Finalizing → Idle`. Verification re-fetches remote
    /// counts purely for diagnostic comparison; a mismatch or a failed
    /// verify read is logged, never fatal. A clear failure aborts the
    /// sequence and is returned to the caller.
    pub async fn replace_all(
        &mut self,
        products: &[ProductRecord],
        plants: &[PlantRecord],
        sink: &mut dyn ProgressSink,
    ) -> Result<ReplaceReport, RemoteError> {
        self.enter(SyncPhase::Clearing);
        sink.report(5.0, "Clearing existing data...");
        let cleared = match self.clear_all().await {
            Ok(summary) => summary,
            Err(e) => {
                self.enter(SyncPhase::Idle);
                return Err(e);
            }
        };

        self.enter(SyncPhase::UploadingProducts);
        sink.report(PRODUCTS_RANGE.start, "Uploading products...");
        let products_result = self.bulk_upload(products, PRODUCTS_RANGE, sink).await;

        self.enter(SyncPhase::UploadingPlants);
        sink.report(PLANTS_RANGE.start, "Uploading plants...");
        let plants_result = self.bulk_upload(plants, PLANTS_RANGE, sink).await;

        self.enter(SyncPhase::Verifying);
        sink.report(95.0, "Verifying remote counts...");
        let remote_counts = match (
            self.remote.list_products().await,
            self.remote.list_plants().await,
        ) {
            (Ok(remote_products), Ok(remote_plants)) => {
                if remote_products.len() != products_result.succeeded
                    || remote_plants.len() != plants_result.succeeded
                {
                    warn!(
                        remote_products = remote_products.len(),
                        remote_plants = remote_plants.len(),
                        expected_products = products_result.succeeded,
                        expected_plants = plants_result.succeeded,
                        "remote counts do not match upload results"
                    );
                }
                Some((remote_products.len(), remote_plants.len()))
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "verification read failed, skipping count check");
                None
            }
        };

        self.enter(SyncPhase::Finalizing);
        sink.report(100.0, "Complete");
        self.enter(SyncPhase::Idle);

        Ok(ReplaceReport {
            cleared,
            products: products_result,
            plants: plants_result,
            remote_counts,
        })
    }
}
