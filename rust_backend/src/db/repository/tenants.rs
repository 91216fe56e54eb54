//! Tenant lookup trait.

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::RepositoryResult;
use crate::core::domain::{Tenant, TenantId};

/// Read access to tenants and their timezone identifiers.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TenantLookup: Send + Sync {
    /// Fetch the tenants with the given ids.
    ///
    /// Ids with no stored tenant are simply absent from the map; deciding
    /// whether that is an error is left to the caller.
    async fn fetch_tenants(&self, ids: &[TenantId]) -> RepositoryResult<HashMap<TenantId, Tenant>>;

    /// Retrieve one tenant.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the tenant doesn't exist
    async fn get_tenant(&self, id: TenantId) -> RepositoryResult<Tenant>;

    /// All tenants, ordered by id.
    async fn list_tenants(&self) -> RepositoryResult<Vec<Tenant>>;
}
