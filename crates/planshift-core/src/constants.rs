//! Application constants and configuration defaults
//!
//! Centralized location for magic numbers and default values

use std::time::Duration;

/// HTTP client configuration
pub mod http {
    use super::*;

    /// Connection timeout for HTTP requests
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Request timeout - individual record operations are small, but the
    /// optimizer call can take a while on large datasets
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
}

/// CSV ingestion limits
pub mod csv {
    /// Maximum accepted dataset file size (10 MB)
    pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

    /// Required dataset file extension
    pub const FILE_EXTENSION: &str = "csv";
}

/// Upload defaults substituted for absent optional plant fields
pub mod defaults {
    /// Overall Equipment Effectiveness when the CSV omits it
    pub const EFFECTIVE_OEE: f64 = 1.0;

    /// Months until a plant can start production
    pub const LEAD_TIME_TO_START: f64 = 0.0;

    /// Maximum utilization target (%)
    pub const MAX_UTILIZATION_TARGET: f64 = 90.0;
}

/// Application directories and remote endpoint defaults
pub mod app {
    /// Config directory name under the user's home
    pub const CONFIG_DIR_NAME: &str = ".planshift";

    /// Plan snapshot collection file name
    pub const PLANS_FILE_NAME: &str = "plans.json";

    /// Config file name
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    /// Default remote store base URL
    pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

    /// Environment variable overriding the remote store base URL
    pub const API_URL_ENV: &str = "PLANSHIFT_API_URL";
}
