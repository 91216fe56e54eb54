//! Storage collaborators and the service layer on top of them.
//!
//! The engine itself is storage-free. This module defines how tenants and raw
//! records are read (the Repository pattern), ships an in-memory backend,
//! and provides repository-agnostic service functions.
//!
//! - `repository`: Trait definitions and [`RepositoryError`](repository::RepositoryError)
//! - `repositories::local`: In-memory implementation
//! - `seed`: JSON seed files for the local repository
//! - `services`: fetch → project → aggregate / compare orchestration
//!
//! # Recommended Usage
//!
//! ```no_run
//! use merchant_tz::db::{seed::SeedData, services};
//! use merchant_tz::services::Engine;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = SeedData::from_file("orders.json")?.into_repository();
//!     let engine = Engine::default();
//!     let tenants = services::list_tenants(&repo).await?;
//!     println!("{} tenants", tenants.len());
//!     Ok(())
//! }
//! ```

pub mod repositories;
pub mod repository;
pub mod seed;
pub mod services;

pub use repositories::LocalRepository;
pub use repository::{
    FullRepository, HealthStatus, RawRecordSource, RecordFilter, RepositoryError,
    RepositoryResult, StorageHealth, TenantLookup,
};
pub use services::{ServiceError, ServiceResult};
