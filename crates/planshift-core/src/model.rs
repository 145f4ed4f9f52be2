//! Domain types: production/facility records, upload payloads, and plans
//!
//! Records carry no remote identity; the remote store assigns an opaque
//! id on create. Snapshots keep exactly what the CSV said — upload
//! defaults are substituted only when mapping to a payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::ingest::RawRecord;

/// One production record, keyed by `product_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub current_plant_id: Option<String>,
    #[serde(default)]
    pub monthly_demand: Option<f64>,
    #[serde(default)]
    pub current_unit_cost: Option<f64>,
    #[serde(default)]
    pub unit_volume_or_weight: Option<f64>,
    #[serde(default)]
    pub cycle_time_sec: Option<f64>,
    #[serde(default)]
    pub yield_rate: Option<f64>,
}

impl ProductRecord {
    /// Header fields a production dataset must define
    pub const REQUIRED_FIELDS: &'static [&'static str] = &[
        "product_id",
        "current_plant_id",
        "monthly_demand",
        "current_unit_cost",
    ];

    /// Build a typed record from a parsed CSV row
    pub fn from_raw(raw: &RawRecord) -> Self {
        Self {
            product_id: raw.string_value("product_id").unwrap_or_default(),
            current_plant_id: raw.string_value("current_plant_id"),
            monthly_demand: raw.number("monthly_demand"),
            current_unit_cost: raw.number("current_unit_cost"),
            unit_volume_or_weight: raw.number("unit_volume_or_weight"),
            cycle_time_sec: raw.number("cycle_time_sec"),
            yield_rate: raw.number("yield_rate"),
        }
    }

    /// Map to the remote create payload
    pub fn payload(&self) -> ProductPayload {
        ProductPayload {
            product_id: self.product_id.clone(),
            current_plant_id: self.current_plant_id.clone(),
            monthly_demand: self.monthly_demand,
            current_unit_cost: self.current_unit_cost,
            unit_volume_or_weight: self.unit_volume_or_weight,
            cycle_time_sec: self.cycle_time_sec,
            yield_rate: self.yield_rate,
        }
    }
}

/// Wire shape for `POST /products`
#[derive(Debug, Clone, Serialize)]
pub struct ProductPayload {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_plant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_demand: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_unit_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_volume_or_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_time_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yield_rate: Option<f64>,
}

/// One facility record, keyed by `plant_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    #[serde(default)]
    pub plant_id: String,
    #[serde(default)]
    pub available_capacity: Option<f64>,
    #[serde(default)]
    pub unit_production_cost: Option<f64>,
    #[serde(default)]
    pub transfer_fixed_cost: Option<f64>,
    #[serde(default)]
    pub effective_oee: Option<f64>,
    #[serde(default)]
    pub lead_time_to_start: Option<f64>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub max_utilization_target: Option<f64>,
}

impl PlantRecord {
    /// Header fields a facility dataset must define
    pub const REQUIRED_FIELDS: &'static [&'static str] = &[
        "plant_id",
        "available_capacity",
        "unit_production_cost",
        "transfer_fixed_cost",
    ];

    /// Build a typed record from a parsed CSV row
    pub fn from_raw(raw: &RawRecord) -> Self {
        Self {
            plant_id: raw.string_value("plant_id").unwrap_or_default(),
            available_capacity: raw.number("available_capacity"),
            unit_production_cost: raw.number("unit_production_cost"),
            transfer_fixed_cost: raw.number("transfer_fixed_cost"),
            effective_oee: raw.number("effective_oee"),
            lead_time_to_start: raw.number("lead_time_to_start"),
            risk_score: raw.number("risk_score"),
            max_utilization_target: raw.number("max_utilization_target"),
        }
    }

    /// Map to the remote create payload, substituting upload defaults
    /// for absent optional fields
    pub fn payload(&self) -> PlantPayload {
        PlantPayload {
            plant_id: self.plant_id.clone(),
            available_capacity: self.available_capacity,
            unit_production_cost: self.unit_production_cost,
            transfer_fixed_cost: self.transfer_fixed_cost,
            effective_oee: self.effective_oee.unwrap_or(defaults::EFFECTIVE_OEE),
            lead_time_to_start: self
                .lead_time_to_start
                .unwrap_or(defaults::LEAD_TIME_TO_START),
            risk_score: self.risk_score,
            max_utilization_target: self
                .max_utilization_target
                .unwrap_or(defaults::MAX_UTILIZATION_TARGET),
        }
    }
}

/// Wire shape for `POST /plants`
#[derive(Debug, Clone, Serialize)]
pub struct PlantPayload {
    pub plant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_production_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_fixed_cost: Option<f64>,
    pub effective_oee: f64,
    pub lead_time_to_start: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    pub max_utilization_target: f64,
}

/// A named local snapshot of both datasets plus metadata
///
/// `products_count`/`plants_count` cache the last successful sync; they
/// may drift from the remote store if it is mutated outside the session
/// controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Opaque id, generated at creation, never reused or mutated
    pub id: String,
    pub name: String,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub plants: Vec<PlantRecord>,
    #[serde(default)]
    pub products_count: usize,
    #[serde(default)]
    pub plants_count: usize,
}

impl Plan {
    /// Create a new plan with a fresh id and timestamp
    pub fn new(
        name: &str,
        products: Vec<ProductRecord>,
        plants: Vec<PlantRecord>,
        products_count: usize,
        plants_count: usize,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            products,
            plants,
            products_count,
            plants_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_payload_substitutes_defaults() {
        let record = PlantRecord {
            plant_id: "PL-1".to_string(),
            available_capacity: Some(5000.0),
            unit_production_cost: Some(2.5),
            transfer_fixed_cost: Some(10000.0),
            ..Default::default()
        };
        let payload = record.payload();
        assert_eq!(payload.effective_oee, 1.0);
        assert_eq!(payload.lead_time_to_start, 0.0);
        assert_eq!(payload.max_utilization_target, 90.0);
        assert_eq!(payload.risk_score, None);
    }

    #[test]
    fn test_plant_payload_keeps_explicit_values() {
        let record = PlantRecord {
            plant_id: "PL-2".to_string(),
            effective_oee: Some(0.85),
            lead_time_to_start: Some(2.0),
            max_utilization_target: Some(80.0),
            ..Default::default()
        };
        let payload = record.payload();
        assert_eq!(payload.effective_oee, 0.85);
        assert_eq!(payload.lead_time_to_start, 2.0);
        assert_eq!(payload.max_utilization_target, 80.0);
    }

    #[test]
    fn test_product_payload_omits_absent_fields() {
        let record = ProductRecord {
            product_id: "P-1".to_string(),
            monthly_demand: Some(100.0),
            ..Default::default()
        };
        let json = serde_json::to_value(record.payload()).expect("serialize payload");
        assert_eq!(json["product_id"], "P-1");
        assert_eq!(json["monthly_demand"], 100.0);
        assert!(json.get("yield_rate").is_none());
    }

    #[test]
    fn test_plan_ids_are_unique() {
        let a = Plan::new("A", Vec::new(), Vec::new(), 0, 0);
        let b = Plan::new("A", Vec::new(), Vec::new(), 0, 0);
        assert_ne!(a.id, b.id);
    }
}
