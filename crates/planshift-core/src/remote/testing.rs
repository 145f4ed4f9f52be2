//! In-memory remote store double with failure injection and call
//! counting, backing the sync and session tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::{PlantPayload, PlantRecord, ProductPayload, ProductRecord};

use super::types::{OptimizeConfig, OptimizeResult, SeedSummary, StoredPlant, StoredProduct};
use super::{DeleteOutcome, RemoteError, RemoteStore};

/// Snapshot-side view of a product payload
fn product_record(payload: &ProductPayload) -> ProductRecord {
    ProductRecord {
        product_id: payload.product_id.clone(),
        current_plant_id: payload.current_plant_id.clone(),
        monthly_demand: payload.monthly_demand,
        current_unit_cost: payload.current_unit_cost,
        unit_volume_or_weight: payload.unit_volume_or_weight,
        cycle_time_sec: payload.cycle_time_sec,
        yield_rate: payload.yield_rate,
    }
}

/// Snapshot-side view of a plant payload
fn plant_record(payload: &PlantPayload) -> PlantRecord {
    PlantRecord {
        plant_id: payload.plant_id.clone(),
        available_capacity: payload.available_capacity,
        unit_production_cost: payload.unit_production_cost,
        transfer_fixed_cost: payload.transfer_fixed_cost,
        effective_oee: Some(payload.effective_oee),
        lead_time_to_start: Some(payload.lead_time_to_start),
        risk_score: payload.risk_score,
        max_utilization_target: Some(payload.max_utilization_target),
    }
}

/// Per-endpoint call counters
#[derive(Debug, Default)]
pub(crate) struct CallCounts {
    pub list_products: AtomicUsize,
    pub create_product: AtomicUsize,
    pub delete_product: AtomicUsize,
    pub list_plants: AtomicUsize,
    pub create_plant: AtomicUsize,
    pub delete_plant: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_products.load(Ordering::SeqCst)
            + self.create_product.load(Ordering::SeqCst)
            + self.delete_product.load(Ordering::SeqCst)
            + self.list_plants.load(Ordering::SeqCst)
            + self.create_plant.load(Ordering::SeqCst)
            + self.delete_plant.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct Inner {
    products: Vec<StoredProduct>,
    plants: Vec<StoredPlant>,
    next_id: i64,
    fail_creates: bool,
    fail_deletes: bool,
    unreachable: bool,
}

/// In-memory [`RemoteStore`] implementation
#[derive(Debug, Default)]
pub(crate) struct MockRemote {
    inner: Mutex<Inner>,
    pub calls: CallCounts,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every create call fail with a validation rejection
    pub fn set_fail_creates(&self, fail: bool) {
        self.inner.lock().unwrap().fail_creates = fail;
    }

    /// Make every delete call fail with a server error
    pub fn set_fail_deletes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_deletes = fail;
    }

    /// Make every call fail as if the store were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.lock().unwrap().unreachable = unreachable;
    }

    /// Pre-populate the store, bypassing failure injection
    pub fn seed(&self, products: Vec<ProductPayload>, plants: Vec<PlantPayload>) {
        let mut inner = self.inner.lock().unwrap();
        for payload in products {
            inner.next_id += 1;
            let stored = StoredProduct {
                id: inner.next_id,
                record: product_record(&payload),
            };
            inner.products.push(stored);
        }
        for payload in plants {
            inner.next_id += 1;
            let stored = StoredPlant {
                id: inner.next_id,
                record: plant_record(&payload),
            };
            inner.plants.push(stored);
        }
    }

    pub fn product_ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .products
            .iter()
            .map(|p| p.record.product_id.clone())
            .collect()
    }

    pub fn plant_ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .plants
            .iter()
            .map(|p| p.record.plant_id.clone())
            .collect()
    }

    fn unreachable_error() -> RemoteError {
        RemoteError::Transport("connection refused".to_string())
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn list_products(&self) -> Result<Vec<StoredProduct>, RemoteError> {
        self.calls.list_products.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(Self::unreachable_error());
        }
        Ok(inner.products.clone())
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<StoredProduct, RemoteError> {
        self.calls.create_product.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(Self::unreachable_error());
        }
        if inner.fail_creates {
            return Err(RemoteError::Status {
                status: 422,
                message: "validation rejected".to_string(),
            });
        }
        inner.next_id += 1;
        let stored = StoredProduct {
            id: inner.next_id,
            record: product_record(payload),
        };
        inner.products.push(stored.clone());
        Ok(stored)
    }

    async fn delete_product(&self, id: i64) -> Result<DeleteOutcome, RemoteError> {
        self.calls.delete_product.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(Self::unreachable_error());
        }
        if inner.fail_deletes {
            return Err(RemoteError::Status {
                status: 500,
                message: "delete failed".to_string(),
            });
        }
        match inner.products.iter().position(|p| p.id == id) {
            Some(pos) => {
                inner.products.remove(pos);
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn list_plants(&self) -> Result<Vec<StoredPlant>, RemoteError> {
        self.calls.list_plants.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(Self::unreachable_error());
        }
        Ok(inner.plants.clone())
    }

    async fn create_plant(&self, payload: &PlantPayload) -> Result<StoredPlant, RemoteError> {
        self.calls.create_plant.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(Self::unreachable_error());
        }
        if inner.fail_creates {
            return Err(RemoteError::Status {
                status: 422,
                message: "validation rejected".to_string(),
            });
        }
        inner.next_id += 1;
        let stored = StoredPlant {
            id: inner.next_id,
            record: plant_record(payload),
        };
        inner.plants.push(stored.clone());
        Ok(stored)
    }

    async fn delete_plant(&self, id: i64) -> Result<DeleteOutcome, RemoteError> {
        self.calls.delete_plant.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(Self::unreachable_error());
        }
        if inner.fail_deletes {
            return Err(RemoteError::Status {
                status: 500,
                message: "delete failed".to_string(),
            });
        }
        match inner.plants.iter().position(|p| p.id == id) {
            Some(pos) => {
                inner.plants.remove(pos);
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn generate_plan(&self, _config: &OptimizeConfig) -> Result<OptimizeResult, RemoteError> {
        let inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(Self::unreachable_error());
        }
        Ok(OptimizeResult {
            assignments: Vec::new(),
            total_transfer_cost: 0.0,
            total_monthly_cost: 0.0,
            total_cost: 0.0,
            average_utilization: 0.0,
            feasible: true,
            constraints_violated: Vec::new(),
            optimization_time_seconds: Some(0.0),
        })
    }

    async fn load_example_data(&self) -> Result<SeedSummary, RemoteError> {
        let inner = self.inner.lock().unwrap();
        if inner.unreachable {
            return Err(Self::unreachable_error());
        }
        Ok(SeedSummary {
            message: "Example data loaded successfully".to_string(),
            products_added: 0,
            plants_added: 0,
        })
    }
}
