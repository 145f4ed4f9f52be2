//! Remote store client
//!
//! Thin request wrapper around the single-tenant data store the
//! optimizer reads from. Every call is independent: no retries, no
//! batching. Transport failures surface as a typed [`RemoteError`] so
//! callers can tell "unreachable" apart from "empty".

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{PlantPayload, ProductPayload};

mod http;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpRemoteStore;
pub use types::{
    OptimizeConfig, OptimizeResult, SeedSummary, StoredPlant, StoredProduct, TransferAssignment,
};

/// Remote store error type
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The store answered with a non-2xx status
    #[error("remote store returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error detail from the response body, or the raw body text
        message: String,
    },

    /// The store could not be reached at all
    #[error("remote store unreachable: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RemoteError::Status {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => RemoteError::Transport(e.to_string()),
        }
    }
}

/// Outcome of a delete call
///
/// A 404 is tolerated: the record being gone is what the caller asked
/// for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// The remote store surface consumed by the sync engine and session
/// controller
///
/// Implemented by [`HttpRemoteStore`] in production and by an
/// in-memory double in tests.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<StoredProduct>, RemoteError>;
    async fn create_product(&self, payload: &ProductPayload) -> Result<StoredProduct, RemoteError>;
    async fn delete_product(&self, id: i64) -> Result<DeleteOutcome, RemoteError>;

    async fn list_plants(&self) -> Result<Vec<StoredPlant>, RemoteError>;
    async fn create_plant(&self, payload: &PlantPayload) -> Result<StoredPlant, RemoteError>;
    async fn delete_plant(&self, id: i64) -> Result<DeleteOutcome, RemoteError>;

    /// Ask the optimizer for a transfer plan; an infeasible plan is a
    /// normal result (`feasible: false`), not an error
    async fn generate_plan(&self, config: &OptimizeConfig) -> Result<OptimizeResult, RemoteError>;

    /// Convenience bulk-insert of the store's built-in example dataset
    async fn load_example_data(&self) -> Result<SeedSummary, RemoteError>;
}
