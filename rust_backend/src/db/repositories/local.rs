//! In-memory local repository implementation.
//!
//! Stores tenants and raw records in memory behind a single lock. Suitable
//! for tests, the report binary and local development.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::core::domain::{RawRecord, Tenant, TenantId};
use crate::db::repository::*;

/// In-memory local repository.
///
/// Clones share the same underlying data.
///
/// # Example
/// ```
/// use merchant_tz::core::Tenant;
/// use merchant_tz::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// repo.insert_tenant(Tenant::new(1, "SP-Merchant", "America/Sao_Paulo"));
/// assert_eq!(repo.tenant_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    tenants: BTreeMap<TenantId, Tenant>,
    records: Vec<RawRecord>,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            tenants: BTreeMap::new(),
            records: Vec::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `tenants` and `records`.
    pub fn with_data(
        tenants: impl IntoIterator<Item = Tenant>,
        records: impl IntoIterator<Item = RawRecord>,
    ) -> Self {
        let repo = Self::new();
        for tenant in tenants {
            repo.insert_tenant(tenant);
        }
        repo.insert_records(records);
        repo
    }

    /// Insert or replace a tenant.
    pub fn insert_tenant(&self, tenant: Tenant) {
        self.data.write().tenants.insert(tenant.id, tenant);
    }

    /// Append records. Referential integrity is not checked here; the engine
    /// reports unknown tenants at projection time.
    pub fn insert_records(&self, records: impl IntoIterator<Item = RawRecord>) {
        let mut data = self.data.write();
        data.records.extend(records);
        data.records
            .sort_by(|a, b| a.order_time_utc.cmp(&b.order_time_utc).then(a.id.cmp(&b.id)));
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.tenants.clear();
        data.records.clear();
    }

    pub fn tenant_count(&self) -> usize {
        self.data.read().tenants.len()
    }

    pub fn record_count(&self) -> usize {
        self.data.read().records.len()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Local store is not healthy")
                .with_operation(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl TenantLookup for LocalRepository {
    async fn fetch_tenants(&self, ids: &[TenantId]) -> RepositoryResult<HashMap<TenantId, Tenant>> {
        self.check_health("fetch_tenants")?;
        let data = self.data.read();
        Ok(ids
            .iter()
            .filter_map(|id| data.tenants.get(id).map(|t| (*id, t.clone())))
            .collect())
    }

    async fn get_tenant(&self, id: TenantId) -> RepositoryResult<Tenant> {
        self.check_health("get_tenant")?;
        self.data.read().tenants.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Tenant {} not found", id),
                ErrorContext::new("get_tenant")
                    .with_entity("tenant")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_tenants(&self) -> RepositoryResult<Vec<Tenant>> {
        self.check_health("list_tenants")?;
        Ok(self.data.read().tenants.values().cloned().collect())
    }
}

#[async_trait]
impl RawRecordSource for LocalRepository {
    async fn fetch_records(&self, filter: &RecordFilter) -> RepositoryResult<Vec<RawRecord>> {
        self.check_health("fetch_records")?;
        let data = self.data.read();
        let records: Vec<RawRecord> = data
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        debug!("Local store returned {} records", records.len());
        Ok(records)
    }

    async fn count_records(&self, filter: &RecordFilter) -> RepositoryResult<usize> {
        self.check_health("count_records")?;
        Ok(self
            .data
            .read()
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .count())
    }
}

#[async_trait]
impl StorageHealth for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<HealthStatus> {
        self.check_health("health_check")?;
        let data = self.data.read();
        let tenant_count = data.tenants.len();
        let record_count = data.records.len();
        Ok(HealthStatus {
            healthy: tenant_count > 0 && record_count > 0,
            tenant_count,
            record_count,
        })
    }
}
