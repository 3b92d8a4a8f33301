//! JSON configuration for the revoker binary.
//!
//! # Example
//!
//! ```json
//! {
//!   "revoker": {
//!     "raService": { "url": "https://ra.internal:9094", "timeoutSecs": 30 },
//!     "saService": { "url": "https://sa.internal:9095" },
//!     "operator": "alice"
//!   }
//! }
//! ```

use std::{path::Path, time::Duration};

use eyre::WrapErr as _;
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub revoker: RevokerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokerConfig {
    /// Registration authority, which performs revocations.
    pub ra_service: ServiceConfig,

    /// Storage authority, which answers queries and stores blocked keys.
    pub sa_service: ServiceConfig,

    /// Operator name recorded with every action. Overrides the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

/// Where a collaborator lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Reads and parses a configuration file.
    pub async fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();

        let json = tokio::fs::read(path)
            .await
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;

        serde_json::from_slice(&json)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))
    }

    /// Operator to act as: the configured one if set, otherwise `fallback`.
    pub fn operator_or(&self, fallback: &str) -> String {
        self.revoker
            .operator
            .clone()
            .unwrap_or_else(|| fallback.to_owned())
    }
}
