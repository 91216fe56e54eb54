//! Batch projection of tenant-scoped raw records.
//!
//! Each record is resolved against its tenant's zone, projected onto the
//! local calendar and classified under that tenant's business window. The
//! batch is atomic: every record is validated and every tenant zone resolved
//! before any output is produced, so a failed call never yields partial
//! results.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::core::domain::{RawRecord, RecordStatus, Tenant, TenantId};
use crate::core::error::{EngineError, EngineResult};
use crate::services::classifier::{classify, Classification, DayType, PolicyBook};
use crate::time::{project, LocalDecomposition, ResolvedZone, TimezoneRegistry};

/// One instant projected and classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedInstant {
    pub local: LocalDecomposition,
    pub classification: Classification,
}

/// A raw record enriched with its tenant's local-calendar attributes.
///
/// Ephemeral: built per query and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRecord {
    pub record: RawRecord,
    pub merchant_name: String,
    pub timezone: String,
    pub country: String,
    pub city: String,
    /// Projection of `record.order_time_utc`.
    pub order: ProjectedInstant,
    /// Projection of `record.completed_time_utc`, when present.
    pub completion: Option<ProjectedInstant>,
}

impl ProjectedRecord {
    pub fn tenant_id(&self) -> TenantId {
        self.record.tenant_id
    }

    pub fn amount(&self) -> f64 {
        self.record.amount
    }

    pub fn status(&self) -> RecordStatus {
        self.record.status
    }

    pub fn local_date(&self) -> NaiveDate {
        self.order.local.local_date
    }

    pub fn local_hour(&self) -> u32 {
        self.order.local.local_hour
    }

    pub fn is_weekend(&self) -> bool {
        self.order.classification.is_weekend
    }

    pub fn is_business_hour(&self) -> bool {
        self.order.classification.is_business_hour
    }
}

/// Flat wire shape; field names are kept stable for existing consumers.
#[derive(Serialize)]
struct ProjectedRecordRow<'a> {
    order_id: i64,
    order_number: &'a str,
    amount: f64,
    currency: &'a str,
    status: RecordStatus,
    merchant_id: TenantId,
    merchant_name: &'a str,
    timezone: &'a str,
    country: &'a str,
    city: &'a str,
    order_time_utc: DateTime<Utc>,
    order_time_local: NaiveDateTime,
    local_date: NaiveDate,
    local_hour: u32,
    local_day_of_week: u32,
    local_weekday: &'a str,
    is_weekend: bool,
    is_business_hour: bool,
    day_type: DayType,
    timezone_offset: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_time_utc: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_time_local: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_local_date: Option<NaiveDate>,
}

impl Serialize for ProjectedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let local = &self.order.local;
        let class = &self.order.classification;
        ProjectedRecordRow {
            order_id: self.record.id,
            order_number: &self.record.order_number,
            amount: self.record.amount,
            currency: &self.record.currency,
            status: self.record.status,
            merchant_id: self.record.tenant_id,
            merchant_name: &self.merchant_name,
            timezone: &self.timezone,
            country: &self.country,
            city: &self.city,
            order_time_utc: self.record.order_time_utc,
            order_time_local: local.local_time,
            local_date: local.local_date,
            local_hour: local.local_hour,
            local_day_of_week: local.local_day_of_week,
            local_weekday: &local.local_weekday,
            is_weekend: class.is_weekend,
            is_business_hour: class.is_business_hour,
            day_type: class.day_type,
            timezone_offset: local.utc_offset_seconds,
            completed_time_utc: self.record.completed_time_utc,
            completed_time_local: self.completion.as_ref().map(|c| c.local.local_time),
            completed_local_date: self.completion.as_ref().map(|c| c.local.local_date),
        }
        .serialize(serializer)
    }
}

type Prepared<'r> = (&'r RawRecord, &'r Tenant, ResolvedZone);

/// Applies projection and classification to batches of records.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionService<'a> {
    registry: &'a TimezoneRegistry,
    policies: &'a PolicyBook,
}

impl<'a> ProjectionService<'a> {
    pub fn new(registry: &'a TimezoneRegistry, policies: &'a PolicyBook) -> Self {
        Self { registry, policies }
    }

    /// Project a batch, preserving input order.
    ///
    /// # Errors
    /// - [`EngineError::InvalidRecord`] for the first record breaking its invariants
    /// - [`EngineError::UnknownTenant`] for the first record whose tenant is missing
    /// - [`EngineError::InvalidTimezone`] if a referenced tenant's zone does not resolve
    pub fn project_all(
        &self,
        records: &[RawRecord],
        tenants: &HashMap<TenantId, Tenant>,
    ) -> EngineResult<Vec<ProjectedRecord>> {
        let batch = self.prepare(records, tenants)?;
        let projected: Vec<ProjectedRecord> = batch
            .iter()
            .map(|(record, tenant, zone)| self.project_resolved(record, tenant, *zone))
            .collect();
        debug!("Projected {} records", projected.len());
        Ok(projected)
    }

    /// Same contract as [`project_all`](Self::project_all), with the
    /// per-record mapping fanned out over `workers` scoped threads.
    pub fn project_all_parallel(
        &self,
        records: &[RawRecord],
        tenants: &HashMap<TenantId, Tenant>,
        workers: usize,
    ) -> EngineResult<Vec<ProjectedRecord>> {
        let batch = self.prepare(records, tenants)?;
        let workers = workers.clamp(1, batch.len().max(1));
        let chunk_size = batch.len().div_ceil(workers).max(1);

        let chunks: Vec<Vec<ProjectedRecord>> = std::thread::scope(|scope| {
            let handles: Vec<_> = batch
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|(record, tenant, zone)| {
                                self.project_resolved(record, tenant, *zone)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        let projected: Vec<ProjectedRecord> = chunks.into_iter().flatten().collect();
        debug!(
            "Projected {} records on {} workers",
            projected.len(),
            workers
        );
        Ok(projected)
    }

    /// Project a single record for a known tenant.
    pub fn project_one(&self, record: &RawRecord, tenant: &Tenant) -> EngineResult<ProjectedRecord> {
        record.validate()?;
        if record.tenant_id != tenant.id {
            return Err(EngineError::UnknownTenant {
                tenant_id: record.tenant_id,
                record_id: record.id,
            });
        }
        let zone = self.registry.resolve(&tenant.timezone)?;
        Ok(self.project_resolved(record, tenant, zone))
    }

    /// Validate the whole batch and resolve every referenced zone up front.
    fn prepare<'r>(
        &self,
        records: &'r [RawRecord],
        tenants: &'r HashMap<TenantId, Tenant>,
    ) -> EngineResult<Vec<Prepared<'r>>> {
        let mut zones: HashMap<TenantId, ResolvedZone> = HashMap::new();
        let mut batch = Vec::with_capacity(records.len());

        for record in records {
            record
                .validate()
                .inspect_err(|e| warn!("Rejecting batch: {}", e))?;

            let tenant = tenants.get(&record.tenant_id).ok_or_else(|| {
                let err = EngineError::UnknownTenant {
                    tenant_id: record.tenant_id,
                    record_id: record.id,
                };
                warn!("Rejecting batch: {}", err);
                err
            })?;

            let zone = match zones.get(&tenant.id) {
                Some(zone) => *zone,
                None => {
                    let zone = self.registry.resolve(&tenant.timezone)?;
                    zones.insert(tenant.id, zone);
                    zone
                }
            };
            batch.push((record, tenant, zone));
        }
        Ok(batch)
    }

    fn project_resolved(
        &self,
        record: &RawRecord,
        tenant: &Tenant,
        zone: ResolvedZone,
    ) -> ProjectedRecord {
        let policy = self.policies.policy_for(tenant.id);
        let project_instant = |instant: DateTime<Utc>| {
            let local = project(instant, &zone);
            let classification = classify(&local, policy);
            ProjectedInstant {
                local,
                classification,
            }
        };

        ProjectedRecord {
            record: record.clone(),
            merchant_name: tenant.name.clone(),
            timezone: tenant.timezone.clone(),
            country: tenant.country.clone(),
            city: tenant.city.clone(),
            order: project_instant(record.order_time_utc),
            completion: record.completed_time_utc.map(project_instant),
        }
    }
}

/// Index tenants by id.
pub fn tenant_map(tenants: impl IntoIterator<Item = Tenant>) -> HashMap<TenantId, Tenant> {
    tenants.into_iter().map(|t| (t.id, t)).collect()
}
