//! Wire types for the remote store API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{PlantRecord, ProductRecord};

/// A production record as stored remotely, with its assigned id
#[derive(Debug, Clone, Deserialize)]
pub struct StoredProduct {
    pub id: i64,
    #[serde(flatten)]
    pub record: ProductRecord,
}

/// A facility record as stored remotely, with its assigned id
#[derive(Debug, Clone, Deserialize)]
pub struct StoredPlant {
    pub id: i64,
    #[serde(flatten)]
    pub record: PlantRecord,
}

/// Optimization request body for `POST /transfer-plan/generate`
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_capital: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
    pub objective_function: String,
    pub allow_fractional_assignment: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_products: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_plants: Vec<String>,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            budget_capital: None,
            transfer_deadline: None,
            discount_rate: None,
            objective_function: "minimize_cost".to_string(),
            allow_fractional_assignment: false,
            excluded_products: Vec::new(),
            excluded_plants: Vec::new(),
        }
    }
}

/// One product-to-plant assignment in an optimization result
#[derive(Debug, Clone, Deserialize)]
pub struct TransferAssignment {
    pub product_id: String,
    #[serde(default)]
    pub source_plant_id: Option<String>,
    pub target_plant_id: String,
    pub assigned_volume: f64,
    pub utilization: f64,
    pub total_cost: f64,
    pub transfer_cost: f64,
    pub monthly_production_cost: f64,
    #[serde(default)]
    pub start_month: Option<i64>,
}

/// Optimization result, feasible or not
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeResult {
    #[serde(default)]
    pub assignments: Vec<TransferAssignment>,
    #[serde(default)]
    pub total_transfer_cost: f64,
    #[serde(default)]
    pub total_monthly_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub average_utilization: f64,
    pub feasible: bool,
    #[serde(default)]
    pub constraints_violated: Vec<String>,
    #[serde(default)]
    pub optimization_time_seconds: Option<f64>,
}

/// Response of `POST /transfer-plan/load-example-data`
#[derive(Debug, Clone, Deserialize)]
pub struct SeedSummary {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub products_added: usize,
    #[serde(default)]
    pub plants_added: usize,
}
