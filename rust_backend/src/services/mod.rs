//! Projection, classification and aggregation services.
//!
//! These are the pure, synchronous building blocks of the engine. They take
//! tenants and raw records that were already fetched and never touch storage;
//! [`crate::db::services`] wires them to repositories.

pub mod aggregation;
pub mod classifier;
pub mod compare;
pub mod engine;
pub mod orders;
pub mod projection;

#[cfg(test)]
mod aggregation_tests;
#[cfg(test)]
mod orders_tests;

pub use aggregation::{
    aggregate, analyze_date, top_n, AggregateGroup, AggregationOptions, AggregationResult,
    DailyAnalysis, Dimension, DimensionValue, TenantRanking, TimeAnchor,
};
pub use classifier::{classify, BusinessWindowPolicy, Classification, DayType, PolicyBook};
pub use compare::{
    compare, hour_difference_from_utc, timezone_demo, DateRelation, TenantComparison,
    TimezoneComparison, TimezoneDemo,
};
pub use engine::Engine;
pub use orders::{list_orders, OrderListingOptions, OrderPage, OrderQuery};
pub use projection::{tenant_map, ProjectedInstant, ProjectedRecord, ProjectionService};
