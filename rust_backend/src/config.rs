//! Engine configuration file support.
//!
//! Configuration is read from TOML. Every section is optional and falls back
//! to the defaults documented on each field, so an empty file is valid.
//!
//! ```toml
//! [business_window]
//! weekend_days = [0, 6]         # 0 = Sunday
//! business_days = [1, 2, 3, 4, 5]
//! start_hour = 9
//! end_hour = 18                 # inclusive
//!
//! [aggregation]
//! completed_statuses = ["paid", "shipped", "delivered"]
//! top_n = 10
//!
//! [orders]
//! default_limit = 20
//! max_limit = 1000
//!
//! [compare]
//! demo_instant = "2024-08-19T00:00:00Z"
//!
//! [[tenant_policies]]
//! tenant_id = 7
//! weekend_days = [5, 6]
//! business_days = [0, 1, 2, 3, 4]
//! ```

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::domain::{RecordStatus, TenantId};
use crate::core::error::EngineResult;
use crate::db::repository::{ErrorContext, RepositoryError};
use crate::services::aggregation::{AggregationOptions, TimeAnchor};
use crate::services::classifier::{BusinessWindowPolicy, PolicyBook};
use crate::services::engine::{default_demo_instant, Engine};
use crate::services::orders::OrderListingOptions;
use crate::time::TimezoneRegistry;

/// File name looked up by [`EngineConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "tz_engine.toml";

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub business_window: BusinessWindowSettings,
    #[serde(default)]
    pub aggregation: AggregationSettings,
    #[serde(default)]
    pub orders: OrderListingOptions,
    #[serde(default)]
    pub compare: CompareSettings,
    #[serde(default)]
    pub tenant_policies: Vec<TenantPolicySettings>,
}

/// Business window, all days numbered 0 = Sunday … 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessWindowSettings {
    #[serde(default = "default_weekend_days")]
    pub weekend_days: Vec<u32>,
    #[serde(default = "default_business_days")]
    pub business_days: Vec<u32>,
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
}

fn default_weekend_days() -> Vec<u32> {
    vec![0, 6]
}

fn default_business_days() -> Vec<u32> {
    vec![1, 2, 3, 4, 5]
}

fn default_start_hour() -> u32 {
    9
}

fn default_end_hour() -> u32 {
    18
}

impl Default for BusinessWindowSettings {
    fn default() -> Self {
        Self {
            weekend_days: default_weekend_days(),
            business_days: default_business_days(),
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
        }
    }
}

impl BusinessWindowSettings {
    pub fn to_policy(&self) -> EngineResult<BusinessWindowPolicy> {
        BusinessWindowPolicy::new(
            self.weekend_days.iter().copied(),
            self.business_days.iter().copied(),
            self.start_hour,
            self.end_hour,
        )
    }
}

/// A business window override for one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPolicySettings {
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub window: BusinessWindowSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Statuses counted in aggregates and rankings.
    #[serde(default = "default_completed_statuses")]
    pub completed_statuses: Vec<RecordStatus>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub anchor: TimeAnchor,
}

fn default_completed_statuses() -> Vec<RecordStatus> {
    vec![
        RecordStatus::Paid,
        RecordStatus::Shipped,
        RecordStatus::Delivered,
    ]
}

fn default_top_n() -> usize {
    10
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            completed_statuses: default_completed_statuses(),
            top_n: default_top_n(),
            anchor: TimeAnchor::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSettings {
    #[serde(default = "default_demo_instant")]
    pub demo_instant: DateTime<Utc>,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            demo_instant: default_demo_instant(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read config file: {}", e),
                ErrorContext::new("load_config").with_details(path.display().to_string()),
            )
        })?;
        let config = Self::from_str(&content)?;
        info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `tz_engine.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// Returns `Ok(None)` only when no file exists. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn from_default_location() -> Result<Option<Self>, RepositoryError> {
        Self::search_from(Path::new(""))
    }

    /// Same search as [`EngineConfig::from_default_location`], rooted at `root`.
    pub fn search_from(root: &Path) -> Result<Option<Self>, RepositoryError> {
        let search_paths = [
            root.join(CONFIG_FILE_NAME),
            root.join("rust_backend").join(CONFIG_FILE_NAME),
            root.join("..").join(CONFIG_FILE_NAME),
        ];

        match search_paths.iter().find(|path| path.exists()) {
            Some(path) => Self::from_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// Validate every policy and assemble an [`Engine`].
    pub fn build_engine(&self) -> EngineResult<Engine> {
        let mut policies = PolicyBook::new(self.business_window.to_policy()?)?;
        for entry in &self.tenant_policies {
            policies = policies.with_override(entry.tenant_id, entry.window.to_policy()?)?;
        }

        let aggregation =
            AggregationOptions::new(self.aggregation.completed_statuses.iter().copied())
                .with_anchor(self.aggregation.anchor);

        Ok(Engine::new(TimezoneRegistry::shared(), policies)
            .with_aggregation(aggregation)
            .with_order_listing(self.orders)
            .with_top_n(self.aggregation.top_n)
            .with_demo_instant(self.compare.demo_instant))
    }
}
