//! High-level service layer.
//!
//! Repository-agnostic operations: each function fetches what it needs
//! through the repository traits, then hands the data to the pure engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Application layer (tz-report, HTTP, ...)    │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │  Service layer (this module)                 │
//! │  fetch → project → aggregate / compare       │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │  Repository traits (TenantLookup,            │
//! │  RawRecordSource, StorageHealth)             │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use merchant_tz::db::{services, repositories::LocalRepository};
//! use merchant_tz::services::Engine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let engine = Engine::default();
//!     let demo = services::timezone_demo(&repo, &engine).await?;
//!     println!("{} timezones", demo.timezones.len());
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use log::{info, warn};
use std::collections::BTreeSet;

use super::repository::{FullRepository, HealthStatus, RecordFilter, RepositoryError};
use crate::core::domain::{Tenant, TenantId};
use crate::core::error::EngineError;
use crate::services::aggregation::{
    analyze_date as analyze_projected, AggregationResult, DailyAnalysis, Dimension,
};
use crate::services::compare::{TimezoneComparison, TimezoneDemo};
use crate::services::engine::Engine;
use crate::services::orders::{list_orders as page_orders, OrderPage, OrderQuery};
use crate::services::projection::ProjectedRecord;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from the service layer: engine and storage errors pass through
/// unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The store is reachable but holds no tenants or no records.
    #[error("Storage unhealthy: {tenant_count} tenants, {record_count} records")]
    Unhealthy {
        tenant_count: usize,
        record_count: usize,
    },
}

impl ServiceError {
    /// Stable code for reporting; engine errors keep their own.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Engine(e) => e.code(),
            Self::Repository(RepositoryError::NotFound { .. }) => "NOT_FOUND",
            Self::Repository(_) => "STORAGE_ERROR",
            Self::Unhealthy { .. } => "STORAGE_UNHEALTHY",
        }
    }

    /// Whether the request itself was at fault.
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::Engine(e) => e.is_caller_error(),
            Self::Repository(RepositoryError::NotFound { .. }) => true,
            _ => false,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Engine(e) => e.is_retryable(),
            Self::Repository(e) => e.is_retryable(),
            Self::Unhealthy { .. } => false,
        }
    }
}

// ==================== Health ====================

/// Check the store and fail if either table is empty.
pub async fn health_check<R: FullRepository>(repo: &R) -> ServiceResult<HealthStatus> {
    let status = repo.health_check().await?;
    if !status.healthy {
        warn!(
            "Health check failed: {} tenants, {} records",
            status.tenant_count, status.record_count
        );
        return Err(ServiceError::Unhealthy {
            tenant_count: status.tenant_count,
            record_count: status.record_count,
        });
    }
    Ok(status)
}

// ==================== Tenants ====================

pub async fn list_tenants<R: FullRepository>(repo: &R) -> ServiceResult<Vec<Tenant>> {
    Ok(repo.list_tenants().await?)
}

// ==================== Projection & Aggregation ====================

/// Fetch records matching `filter` with their tenants and project them.
///
/// Records referencing a tenant the store does not know fail the whole call
/// with [`EngineError::UnknownTenant`].
pub async fn project_records<R: FullRepository>(
    repo: &R,
    engine: &Engine,
    filter: &RecordFilter,
) -> ServiceResult<Vec<ProjectedRecord>> {
    let records = repo.fetch_records(filter).await?;
    let ids: Vec<TenantId> = records
        .iter()
        .map(|r| r.tenant_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let tenants = repo.fetch_tenants(&ids).await?;
    Ok(engine.project(&records, &tenants)?)
}

/// Project and aggregate records matching `filter` with the engine's options.
pub async fn aggregate_records<R: FullRepository>(
    repo: &R,
    engine: &Engine,
    filter: &RecordFilter,
    dimensions: &[Dimension],
) -> ServiceResult<AggregationResult> {
    let projected = project_records(repo, engine, filter).await?;
    Ok(engine.aggregate(&projected, dimensions))
}

/// Daily report for one local calendar date.
///
/// Fetches the UTC window `[date - 1, date + 2)` so every offset between
/// -24h and +24h is covered, then keeps records whose projected local date
/// is `date`.
pub async fn analyze_date<R: FullRepository>(
    repo: &R,
    engine: &Engine,
    date: NaiveDate,
) -> ServiceResult<DailyAnalysis> {
    let options = engine.aggregation_options();
    let filter = RecordFilter::new()
        .between(day_start(date, -1), day_start(date, 2))
        .anchored_on(options.anchor)
        .with_statuses(options.allowed_statuses.iter().copied());

    let projected = project_records(repo, engine, &filter).await?;
    let analysis = analyze_projected(&projected, date, options, engine.top_n());
    info!(
        "Analysis for {}: {} orders across {} timezones",
        date,
        analysis.total_orders,
        analysis.timezone_stats.len()
    );
    Ok(analysis)
}

fn day_start(date: NaiveDate, offset_days: i64) -> DateTime<Utc> {
    let shifted = if offset_days >= 0 {
        date.checked_add_days(Days::new(offset_days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(offset_days.unsigned_abs()))
    };
    shifted.unwrap_or(date).and_time(NaiveTime::MIN).and_utc()
}

// ==================== Orders ====================

/// Page through projected orders, newest first.
pub async fn list_orders<R: FullRepository>(
    repo: &R,
    engine: &Engine,
    query: &OrderQuery,
) -> ServiceResult<OrderPage> {
    let mut filter = RecordFilter::new();
    if let Some(tz) = query.timezone.as_deref().map(str::trim).filter(|tz| !tz.is_empty()) {
        let zone = engine.registry().resolve(tz)?;
        let tenants = repo.list_tenants().await?;
        filter = filter.for_tenants(
            tenants
                .iter()
                .filter(|t| t.timezone == zone.identifier())
                .map(|t| t.id),
        );
    }

    let projected = project_records(repo, engine, &filter).await?;
    Ok(page_orders(
        projected,
        query,
        engine.order_listing(),
        engine.registry(),
    )?)
}

// ==================== Comparison ====================

/// Compare `instant` across every stored tenant, ordered by id.
pub async fn compare_all<R: FullRepository>(
    repo: &R,
    engine: &Engine,
    instant: DateTime<Utc>,
) -> ServiceResult<TimezoneComparison> {
    let tenants = repo.list_tenants().await?;
    Ok(engine.compare(instant, &tenants)?)
}

/// Compare `instant` across the given tenants, in the given order.
pub async fn compare_tenants<R: FullRepository>(
    repo: &R,
    engine: &Engine,
    instant: DateTime<Utc>,
    ids: &[TenantId],
) -> ServiceResult<TimezoneComparison> {
    let found = repo.fetch_tenants(ids).await?;
    let mut tenants = Vec::with_capacity(ids.len());
    for id in ids {
        match found.get(id) {
            Some(tenant) => tenants.push(tenant.clone()),
            None => {
                return Err(RepositoryError::not_found(format!("Tenant {} not found", id)).into())
            }
        }
    }
    Ok(engine.compare(instant, &tenants)?)
}

/// The timezone demo at the engine's configured instant.
pub async fn timezone_demo<R: FullRepository>(
    repo: &R,
    engine: &Engine,
) -> ServiceResult<TimezoneDemo> {
    let tenants = repo.list_tenants().await?;
    Ok(engine.demo(&tenants)?)
}
