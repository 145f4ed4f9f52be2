//! Application path resolution

use std::path::PathBuf;

use crate::constants::app;

/// Application data directory (`~/.planshift`)
///
/// Falls back to a relative directory when no home directory can be
/// resolved (e.g. stripped-down containers).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(app::CONFIG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(app::CONFIG_DIR_NAME))
}

/// Path of the plan snapshot collection
pub fn plans_file() -> PathBuf {
    data_dir().join(app::PLANS_FILE_NAME)
}

/// Path of the config file
pub fn config_file() -> PathBuf {
    data_dir().join(app::CONFIG_FILE_NAME)
}
