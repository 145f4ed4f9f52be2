//! Plan snapshot persistence
//!
//! A single JSON-backed collection of plan snapshots plus the active
//! plan marker, independent of the remote store lifecycle. Writes are
//! atomic (temp file + rename) so a crash mid-save never corrupts the
//! collection.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::Plan;

/// Snapshot storage error type
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// On-disk shape of the snapshot collection
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    plans: Vec<Plan>,
    #[serde(default)]
    active_plan_id: Option<String>,
}

/// Local durable collection of named plan snapshots, keyed by id
pub struct SnapshotStore {
    path: PathBuf,
    plans: Vec<Plan>,
    active_plan_id: Option<String>,
}

impl SnapshotStore {
    /// Open the collection at the given path; a missing file is an
    /// empty collection
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let path = path.into();
        let file = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => SnapshotFile::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), plans = file.plans.len(), "opened snapshot store");
        Ok(Self {
            path,
            plans: file.plans,
            active_plan_id: file.active_plan_id,
        })
    }

    /// Number of stored plans
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Look up a plan by id
    pub fn get(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    /// Mutable lookup; caller is responsible for calling
    /// [`SnapshotStore::persist`] afterwards
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Plan> {
        self.plans.iter_mut().find(|plan| plan.id == id)
    }

    /// Plans in display order, newest-created-first
    pub fn list(&self) -> Vec<&Plan> {
        let mut plans: Vec<&Plan> = self.plans.iter().collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        plans
    }

    /// Append a plan and persist the collection
    pub fn insert(&mut self, plan: Plan) -> Result<(), SnapshotError> {
        self.plans.push(plan);
        self.persist()
    }

    /// Remove a plan by id and persist; clears the active marker when
    /// it pointed at the removed plan
    pub fn remove(&mut self, id: &str) -> Result<Option<Plan>, SnapshotError> {
        let Some(pos) = self.plans.iter().position(|plan| plan.id == id) else {
            return Ok(None);
        };
        let removed = self.plans.remove(pos);
        if self.active_plan_id.as_deref() == Some(id) {
            self.active_plan_id = None;
        }
        self.persist()?;
        Ok(Some(removed))
    }

    /// Id of the currently active plan, if any
    pub fn active_plan_id(&self) -> Option<&str> {
        self.active_plan_id.as_deref()
    }

    /// Set or clear the active plan marker and persist
    pub fn set_active(&mut self, id: Option<String>) -> Result<(), SnapshotError> {
        self.active_plan_id = id;
        self.persist()
    }

    /// Write the collection to disk atomically
    pub fn persist(&self) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = SnapshotFile {
            plans: self.plans.clone(),
            active_plan_id: self.active_plan_id.clone(),
        };
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&file)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
