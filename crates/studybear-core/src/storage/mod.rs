mod config;
pub mod snapshot;
pub mod writer;

pub use config::{Config, PricingConfig, RewardPricing};
pub use snapshot::SnapshotStore;
pub use writer::SnapshotWriter;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `STUDYBEAR_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/studybear`, or `~/.config/studybear-dev` with
/// `STUDYBEAR_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STUDYBEAR_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYBEAR_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studybear-dev")
            } else {
                base_dir.join("studybear")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
