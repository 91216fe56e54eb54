//! Core domain models for multi-tenant order data.
//!
//! This module defines the tenant and raw-record types handed to the engine
//! by the storage collaborator, together with the engine's error taxonomy.

pub mod domain;
pub mod error;

#[cfg(test)]
mod error_tests;

pub use domain::{RawRecord, RecordStatus, Tenant, TenantId, TenantStatus};
pub use error::{EngineError, EngineResult};
