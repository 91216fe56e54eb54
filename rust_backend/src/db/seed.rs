//! JSON seed files for the local repository.
//!
//! ```json
//! {
//!   "tenants": [{ "id": 1, "name": "SP-Merchant", "timezone": "America/Sao_Paulo" }],
//!   "records": [{ "order_id": 1, "merchant_id": 1, "amount": 50.0, "currency": "BRL",
//!                 "status": "paid", "order_time_utc": "2024-08-20T02:00:00Z" }]
//! }
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::domain::{RawRecord, Tenant};
use crate::db::repositories::LocalRepository;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

impl SeedData {
    /// Parse seed data from JSON text and validate every record.
    pub fn from_json_str(content: &str) -> RepositoryResult<Self> {
        let seed: SeedData = serde_json::from_str(content).map_err(|e| {
            RepositoryError::validation_with_context(
                format!("Failed to parse seed data: {}", e),
                ErrorContext::new("load_seed"),
            )
        })?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::not_found_with_context(
                format!("Failed to read seed file: {}", e),
                ErrorContext::new("load_seed").with_details(path.display().to_string()),
            )
        })?;
        let seed = Self::from_json_str(&content)?;
        info!(
            "Loaded {} tenants and {} records from {}",
            seed.tenants.len(),
            seed.records.len(),
            path.display()
        );
        Ok(seed)
    }

    /// Reject records breaking their data-model invariants.
    pub fn validate(&self) -> RepositoryResult<()> {
        for record in &self.records {
            record.validate().map_err(|e| {
                RepositoryError::validation_with_context(
                    e.to_string(),
                    ErrorContext::new("load_seed")
                        .with_entity("record")
                        .with_entity_id(record.id),
                )
            })?;
        }
        Ok(())
    }

    pub fn into_repository(self) -> LocalRepository {
        LocalRepository::with_data(self.tenants, self.records)
    }
}
