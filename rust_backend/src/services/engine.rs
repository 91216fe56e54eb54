//! Configured bundle of registry, policies and query defaults.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::domain::{RawRecord, Tenant, TenantId};
use crate::core::error::EngineResult;
use crate::services::aggregation::{aggregate, AggregationOptions, AggregationResult, Dimension};
use crate::services::classifier::PolicyBook;
use crate::services::compare::{compare, timezone_demo, TimezoneComparison, TimezoneDemo};
use crate::services::orders::OrderListingOptions;
use crate::services::projection::{ProjectedRecord, ProjectionService};
use crate::time::TimezoneRegistry;

/// The instant the timezone demo is evaluated at unless configured otherwise.
pub fn default_demo_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 19, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Everything a query needs besides the data itself.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<TimezoneRegistry>,
    policies: PolicyBook,
    aggregation: AggregationOptions,
    orders: OrderListingOptions,
    top_n: usize,
    demo_instant: DateTime<Utc>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(TimezoneRegistry::shared(), PolicyBook::default())
    }
}

impl Engine {
    pub fn new(registry: Arc<TimezoneRegistry>, policies: PolicyBook) -> Self {
        Self {
            registry,
            policies,
            aggregation: AggregationOptions::completed_orders(),
            orders: OrderListingOptions::default(),
            top_n: 10,
            demo_instant: default_demo_instant(),
        }
    }

    pub fn with_aggregation(mut self, aggregation: AggregationOptions) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_order_listing(mut self, orders: OrderListingOptions) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_demo_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.demo_instant = instant;
        self
    }

    pub fn registry(&self) -> &TimezoneRegistry {
        &self.registry
    }

    pub fn policies(&self) -> &PolicyBook {
        &self.policies
    }

    pub fn aggregation_options(&self) -> &AggregationOptions {
        &self.aggregation
    }

    pub fn order_listing(&self) -> &OrderListingOptions {
        &self.orders
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn demo_instant(&self) -> DateTime<Utc> {
        self.demo_instant
    }

    pub fn projection(&self) -> ProjectionService<'_> {
        ProjectionService::new(&self.registry, &self.policies)
    }

    pub fn project(
        &self,
        records: &[RawRecord],
        tenants: &HashMap<TenantId, Tenant>,
    ) -> EngineResult<Vec<ProjectedRecord>> {
        self.projection().project_all(records, tenants)
    }

    /// Aggregate with the configured status set and anchor.
    pub fn aggregate(
        &self,
        records: &[ProjectedRecord],
        dimensions: &[Dimension],
    ) -> AggregationResult {
        aggregate(records, dimensions, &self.aggregation)
    }

    pub fn compare(
        &self,
        instant: DateTime<Utc>,
        tenants: &[Tenant],
    ) -> EngineResult<TimezoneComparison> {
        compare(instant, tenants, &self.registry, &self.policies)
    }

    pub fn demo(&self, tenants: &[Tenant]) -> EngineResult<TimezoneDemo> {
        timezone_demo(self.demo_instant, tenants, &self.registry, &self.policies)
    }
}
