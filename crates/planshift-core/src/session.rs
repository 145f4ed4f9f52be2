//! Plan lifecycle controller
//!
//! Coordinates the snapshot store, sync engine, and remote client for
//! create/open/delete/refresh/leave operations. The remote store is a
//! single shared workspace: opening a plan clears it and re-uploads the
//! plan's records, overwriting whatever was there (optimistic
//! overwrite — the store is assumed single-writer, last writer wins).
//!
//! Destructive operations never block on user input. A gated operation
//! called with [`Decision::Unconfirmed`] returns
//! [`Outcome::NeedsConfirmation`]; the caller shows the request and
//! resumes by calling again with [`Decision::Confirmed`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::model::{Plan, PlantRecord, ProductRecord};
use crate::remote::{OptimizeConfig, OptimizeResult, RemoteError, RemoteStore, SeedSummary};
use crate::storage::{SnapshotError, SnapshotStore};
use crate::sync::{ProgressSink, ReplaceReport, SyncEngine};

/// Session error type
#[derive(Debug, Error)]
pub enum SessionError {
    /// Missing required user input, surfaced before any remote mutation
    #[error("validation failed: {0}")]
    Validation(String),

    /// No plan with the given id in the local collection
    #[error("plan not found: {0}")]
    PlanNotFound(String),

    /// Operation requires an active plan
    #[error("no active plan")]
    NoActivePlan,

    /// Remote store failure
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Local persistence failure
    #[error(transparent)]
    Storage(#[from] SnapshotError),
}

/// Caller's answer to a confirmation gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Unconfirmed,
    Confirmed,
}

/// A destructive action awaiting explicit confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationRequest {
    /// Permanently delete a plan from the local collection
    DeletePlan { id: String, name: String },
    /// Opening this plan will overwrite the remote store's current
    /// contents
    OverwriteRemoteData { plan_name: String },
    /// Leaving the active plan will discard unsaved remote state
    DiscardRemoteData,
}

impl ConfirmationRequest {
    /// User-facing description of what is about to happen
    pub fn message(&self) -> String {
        match self {
            ConfirmationRequest::DeletePlan { name, .. } => format!(
                "Are you sure you want to delete the plan \"{name}\"? This action cannot be undone."
            ),
            ConfirmationRequest::OverwriteRemoteData { plan_name } => format!(
                "The remote store currently holds data. Opening \"{plan_name}\" will overwrite it."
            ),
            ConfirmationRequest::DiscardRemoteData => {
                "You have unsaved data in the current plan. Going back will not save this data."
                    .to_string()
            }
        }
    }
}

/// Result of a gated operation
#[derive(Debug)]
pub enum Outcome<T> {
    /// The operation ran to completion
    Done(T),
    /// The operation needs confirmation; call again with
    /// [`Decision::Confirmed`] to proceed
    NeedsConfirmation(ConfirmationRequest),
}

impl<T> Outcome<T> {
    /// Unwrap a completed outcome, panicking on a pending confirmation
    /// (test helper)
    #[cfg(test)]
    pub fn unwrap_done(self) -> T {
        match self {
            Outcome::Done(value) => value,
            Outcome::NeedsConfirmation(request) => {
                panic!("expected completed outcome, got confirmation request: {request:?}")
            }
        }
    }
}

/// Top-level state machine coordinating snapshots, sync, and the
/// remote store
pub struct SessionController {
    snapshots: SnapshotStore,
    remote: Arc<dyn RemoteStore>,
    engine: SyncEngine,
}

impl SessionController {
    pub fn new(snapshots: SnapshotStore, remote: Arc<dyn RemoteStore>) -> Self {
        let engine = SyncEngine::new(remote.clone());
        Self {
            snapshots,
            remote,
            engine,
        }
    }

    /// Plans in display order, newest-created-first
    pub fn plans(&self) -> Vec<&Plan> {
        self.snapshots.list()
    }

    /// Look up a plan by id
    pub fn plan(&self, id: &str) -> Option<&Plan> {
        self.snapshots.get(id)
    }

    /// The currently active plan, if any
    pub fn active_plan(&self) -> Option<&Plan> {
        self.snapshots
            .active_plan_id()
            .and_then(|id| self.snapshots.get(id))
    }

    /// Advisory check whether the remote store holds any records
    ///
    /// A read failure degrades to "no data": the caller proceeds as if
    /// there were nothing to lose.
    async fn remote_has_data(&self) -> bool {
        let products = match self.remote.list_products().await {
            Ok(products) => products.len(),
            Err(e) => {
                warn!(error = %e, "could not check remote products, assuming none");
                0
            }
        };
        let plants = match self.remote.list_plants().await {
            Ok(plants) => plants.len(),
            Err(e) => {
                warn!(error = %e, "could not check remote plants, assuming none");
                0
            }
        };
        products + plants > 0
    }

    /// Create a plan from two ingested datasets and sync it to the
    /// remote store
    ///
    /// Validates before mutating: a missing name or two empty datasets
    /// fail without a single remote call. A write-path remote failure
    /// aborts the sequence and leaves the local collection unchanged —
    /// no partial plan is ever committed.
    pub async fn create_plan(
        &mut self,
        name: &str,
        products: Vec<ProductRecord>,
        plants: Vec<PlantRecord>,
        sink: &mut dyn ProgressSink,
    ) -> Result<Plan, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::Validation("plan name is required".to_string()));
        }
        if products.is_empty() && plants.is_empty() {
            return Err(SessionError::Validation(
                "at least one dataset must contain records".to_string(),
            ));
        }

        let report = self.engine.replace_all(&products, &plants, sink).await?;

        let plan = Plan::new(
            name,
            products,
            plants,
            report.products.succeeded,
            report.plants.succeeded,
        );
        info!(
            plan_id = %plan.id,
            name = %plan.name,
            products = plan.products_count,
            plants = plan.plants_count,
            "created plan"
        );
        self.snapshots.insert(plan.clone())?;
        self.snapshots.set_active(Some(plan.id.clone()))?;
        Ok(plan)
    }

    /// Open a saved plan, replacing the remote store's contents with
    /// its records
    ///
    /// The remote store holds at most one logical plan at a time, so
    /// switching plans is clear-then-upload. When the store already
    /// holds records, an unconfirmed call returns a confirmation
    /// request instead of silently overwriting them.
    pub async fn open_plan(
        &mut self,
        id: &str,
        decision: Decision,
        sink: &mut dyn ProgressSink,
    ) -> Result<Outcome<ReplaceReport>, SessionError> {
        let plan = self
            .snapshots
            .get(id)
            .ok_or_else(|| SessionError::PlanNotFound(id.to_string()))?;
        let plan_name = plan.name.clone();
        let products = plan.products.clone();
        let plants = plan.plants.clone();

        if decision == Decision::Unconfirmed && self.remote_has_data().await {
            return Ok(Outcome::NeedsConfirmation(
                ConfirmationRequest::OverwriteRemoteData { plan_name },
            ));
        }

        let report = self.engine.replace_all(&products, &plants, sink).await?;
        self.snapshots.set_active(Some(id.to_string()))?;
        info!(plan_id = id, "opened plan");
        Ok(Outcome::Done(report))
    }

    /// Delete a plan from the local collection
    ///
    /// Requires explicit confirmation; never touches the remote store.
    pub fn delete_plan(
        &mut self,
        id: &str,
        decision: Decision,
    ) -> Result<Outcome<Plan>, SessionError> {
        let plan = self
            .snapshots
            .get(id)
            .ok_or_else(|| SessionError::PlanNotFound(id.to_string()))?;

        if decision == Decision::Unconfirmed {
            return Ok(Outcome::NeedsConfirmation(ConfirmationRequest::DeletePlan {
                id: plan.id.clone(),
                name: plan.name.clone(),
            }));
        }

        let removed = self
            .snapshots
            .remove(id)?
            .ok_or_else(|| SessionError::PlanNotFound(id.to_string()))?;
        info!(plan_id = id, name = %removed.name, "deleted plan");
        Ok(Outcome::Done(removed))
    }

    /// Re-snapshot a plan from the remote store's current records
    ///
    /// Used after direct record edits so the local snapshot stays
    /// consistent with the remote store it mirrors. A failed read
    /// surfaces the error and leaves the snapshot untouched.
    pub async fn refresh_plan(&mut self, id: &str) -> Result<Plan, SessionError> {
        let products = self.remote.list_products().await?;
        let plants = self.remote.list_plants().await?;

        let plan = self
            .snapshots
            .get_mut(id)
            .ok_or_else(|| SessionError::PlanNotFound(id.to_string()))?;
        plan.products = products.into_iter().map(|stored| stored.record).collect();
        plan.plants = plants.into_iter().map(|stored| stored.record).collect();
        plan.products_count = plan.products.len();
        plan.plants_count = plan.plants.len();
        let snapshot = plan.clone();
        self.snapshots.persist()?;

        info!(
            plan_id = id,
            products = snapshot.products_count,
            plants = snapshot.plants_count,
            "refreshed plan from remote"
        );
        Ok(snapshot)
    }

    /// Refresh the active plan from the remote store
    pub async fn refresh_active(&mut self) -> Result<Plan, SessionError> {
        let id = self
            .snapshots
            .active_plan_id()
            .ok_or(SessionError::NoActivePlan)?
            .to_string();
        self.refresh_plan(&id).await
    }

    /// Leave the active plan and return to the plan list
    ///
    /// Unsaved remote state is not auto-saved back into the snapshot;
    /// when the store holds records, an unconfirmed call returns a
    /// confirmation request. An unreachable store degrades to "nothing
    /// to lose" and the leave proceeds.
    pub async fn leave_active_plan(
        &mut self,
        decision: Decision,
    ) -> Result<Outcome<()>, SessionError> {
        if self.snapshots.active_plan_id().is_none() {
            return Ok(Outcome::Done(()));
        }

        if decision == Decision::Unconfirmed && self.remote_has_data().await {
            return Ok(Outcome::NeedsConfirmation(
                ConfirmationRequest::DiscardRemoteData,
            ));
        }

        self.snapshots.set_active(None)?;
        Ok(Outcome::Done(()))
    }

    /// Ask the optimizer for a transfer plan over the remote store's
    /// current records
    pub async fn generate(&self, config: &OptimizeConfig) -> Result<OptimizeResult, SessionError> {
        Ok(self.remote.generate_plan(config).await?)
    }

    /// Seed the remote store with its built-in example dataset
    pub async fn seed_example_data(&self) -> Result<SeedSummary, SessionError> {
        Ok(self.remote.load_example_data().await?)
    }
}
