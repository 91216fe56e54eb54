//! Repository trait definitions for the storage collaborator.
//!
//! The engine never owns tenants or records. It reads them through these
//! focused traits, so any backend (in-memory, SQL, remote service) can be
//! plugged in behind the service layer.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`tenants`]: Tenant lookup by id
//! - [`records`]: Raw record queries with [`RecordFilter`]
//!
//! # Convenience Trait Bound
//!
//! For functions that need every capability, use [`FullRepository`]:
//!
//! ```ignore
//! async fn report<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     let tenants = repo.list_tenants().await?;
//!     let records = repo.fetch_records(&RecordFilter::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod records;
pub mod tenants;

use async_trait::async_trait;
use serde::Serialize;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use records::{RawRecordSource, RecordFilter};
pub use tenants::TenantLookup;

/// Storage health as reported by [`StorageHealth::health_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// False when either table is empty.
    pub healthy: bool,
    pub tenant_count: usize,
    pub record_count: usize,
}

#[async_trait]
pub trait StorageHealth: Send + Sync {
    /// Check connectivity and report stored row counts.
    ///
    /// # Returns
    /// - `Ok(status)` with `healthy == false` if the store is reachable but empty
    /// - `Err(RepositoryError)` if the store cannot be reached
    async fn health_check(&self) -> RepositoryResult<HealthStatus>;
}

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: TenantLookup + RawRecordSource + StorageHealth {}

impl<T> FullRepository for T where T: TenantLookup + RawRecordSource + StorageHealth {}
