//! Cross-timezone comparison of a single UTC instant.
//!
//! Given one instant and a set of tenants, every tenant's local view of that
//! instant is computed and summarised: how many tenants are already on the
//! next calendar day (or still on the previous one), how many are inside
//! business hours or in their weekend, and how far apart the local clocks are.

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::Serialize;

use crate::core::domain::Tenant;
use crate::core::error::{EngineError, EngineResult};
use crate::services::classifier::{classify, Classification, PolicyBook};
use crate::time::{project, LocalDecomposition, ResolvedZone, TimezoneRegistry};

/// Where a tenant's local date sits relative to the UTC date of the instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRelation {
    PrevDay,
    SameDay,
    NextDay,
}

impl DateRelation {
    fn between(local: NaiveDate, utc: NaiveDate) -> Self {
        if local > utc {
            DateRelation::NextDay
        } else if local < utc {
            DateRelation::PrevDay
        } else {
            DateRelation::SameDay
        }
    }
}

/// One tenant's view of the compared instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantComparison {
    pub tenant: Tenant,
    pub local: LocalDecomposition,
    pub classification: Classification,
    /// Whole-hour offset from UTC, wrapped into (-12, +12].
    pub hour_difference_from_utc: i32,
    /// `hour_difference_from_utc` rendered as `+8h` / `-11h`.
    pub time_difference: String,
    pub date_relation: DateRelation,
}

/// Summary statistics across all compared tenants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub total_tenants: usize,
    pub next_day_count: usize,
    pub same_day_count: usize,
    pub prev_day_count: usize,
    pub business_hour_count: usize,
    pub weekend_count: usize,
    pub average_hour: f64,
    pub min_local_hour: u32,
    pub max_local_hour: u32,
    pub timezone_spread_hours: u32,
    pub min_offset_seconds: i32,
    pub max_offset_seconds: i32,
}

/// Result of [`compare`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimezoneComparison {
    pub utc_time: DateTime<Utc>,
    pub utc_date: NaiveDate,
    pub comparisons: Vec<TenantComparison>,
    pub summary: ComparisonSummary,
}

/// Wrap a whole-hour offset into (-12, +12]: `+13` becomes `-11`.
pub fn wrap_hour_difference(hours: i32) -> i32 {
    (hours + 11).rem_euclid(24) - 11
}

/// Signed hour difference from UTC for an offset in seconds.
///
/// Partial hours are truncated toward zero (`+05:30` gives 5, `-03:30`
/// gives -3) before wrapping. This depends only on the offset, so it can
/// differ by one from subtracting wall-clock hours (`-03:30` at `HH:00Z`
/// reads as -4 on the clock face).
pub fn hour_difference_from_utc(offset_seconds: i32) -> i32 {
    wrap_hour_difference(offset_seconds / 3600)
}

fn format_hour_difference(hours: i32) -> String {
    format!("{:+}h", hours)
}

/// Compare `instant` across `tenants`, preserving tenant order.
///
/// # Errors
/// - [`EngineError::EmptyTenantSet`] when `tenants` is empty
/// - [`EngineError::InvalidTimezone`] when any tenant's zone does not resolve
pub fn compare(
    instant: DateTime<Utc>,
    tenants: &[Tenant],
    registry: &TimezoneRegistry,
    policies: &PolicyBook,
) -> EngineResult<TimezoneComparison> {
    if tenants.is_empty() {
        return Err(EngineError::EmptyTenantSet);
    }

    let zones: Vec<ResolvedZone> = tenants
        .iter()
        .map(|t| registry.resolve(&t.timezone))
        .collect::<EngineResult<_>>()?;

    let utc_date = instant.date_naive();
    let comparisons: Vec<TenantComparison> = tenants
        .iter()
        .zip(zones)
        .map(|(tenant, zone)| {
            let local = project(instant, &zone);
            let classification = classify(&local, policies.policy_for(tenant.id));
            let hour_difference = hour_difference_from_utc(local.utc_offset_seconds);
            TenantComparison {
                tenant: tenant.clone(),
                classification,
                hour_difference_from_utc: hour_difference,
                time_difference: format_hour_difference(hour_difference),
                date_relation: DateRelation::between(local.local_date, utc_date),
                local,
            }
        })
        .collect();

    let summary = summarize(&comparisons);
    debug!(
        "Compared {} across {} tenants ({} next-day, {} prev-day)",
        instant, summary.total_tenants, summary.next_day_count, summary.prev_day_count
    );

    Ok(TimezoneComparison {
        utc_time: instant,
        utc_date,
        comparisons,
        summary,
    })
}

/// Callers guarantee `comparisons` is non-empty.
fn summarize(comparisons: &[TenantComparison]) -> ComparisonSummary {
    let count_relation = |rel: DateRelation| {
        comparisons
            .iter()
            .filter(|c| c.date_relation == rel)
            .count()
    };
    let hours: Vec<u32> = comparisons.iter().map(|c| c.local.local_hour).collect();
    let offsets: Vec<i32> = comparisons
        .iter()
        .map(|c| c.local.utc_offset_seconds)
        .collect();

    let min_local_hour = hours.iter().copied().min().unwrap_or(0);
    let max_local_hour = hours.iter().copied().max().unwrap_or(0);

    ComparisonSummary {
        total_tenants: comparisons.len(),
        next_day_count: count_relation(DateRelation::NextDay),
        same_day_count: count_relation(DateRelation::SameDay),
        prev_day_count: count_relation(DateRelation::PrevDay),
        business_hour_count: comparisons
            .iter()
            .filter(|c| c.classification.is_business_hour)
            .count(),
        weekend_count: comparisons
            .iter()
            .filter(|c| c.classification.is_weekend)
            .count(),
        average_hour: hours.iter().map(|h| *h as f64).sum::<f64>() / hours.len() as f64,
        min_local_hour,
        max_local_hour,
        timezone_spread_hours: max_local_hour - min_local_hour,
        min_offset_seconds: offsets.iter().copied().min().unwrap_or(0),
        max_offset_seconds: offsets.iter().copied().max().unwrap_or(0),
    }
}

/// One row of the timezone demo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimezoneConversion {
    pub timezone: String,
    pub country: String,
    pub city: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub local_time: String,
    pub local_date: NaiveDate,
    /// `+HH:MM`
    pub offset: String,
    pub is_next_day: bool,
    pub is_prev_day: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoSummary {
    pub total_timezones: usize,
    pub next_day_count: usize,
    pub same_day_count: usize,
    pub prev_day_count: usize,
    pub min_offset_hours: i32,
    pub max_offset_hours: i32,
}

/// How one UTC instant reads on every tenant's wall clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimezoneDemo {
    pub utc_time: DateTime<Utc>,
    pub description: String,
    pub timezones: Vec<TimezoneConversion>,
    pub summary: DemoSummary,
}

/// Build the demo view of `instant` for `tenants`.
pub fn timezone_demo(
    instant: DateTime<Utc>,
    tenants: &[Tenant],
    registry: &TimezoneRegistry,
    policies: &PolicyBook,
) -> EngineResult<TimezoneDemo> {
    let comparison = compare(instant, tenants, registry, policies)?;
    let summary = &comparison.summary;

    let timezones = comparison
        .comparisons
        .iter()
        .map(|c| TimezoneConversion {
            timezone: c.tenant.timezone.clone(),
            country: c.tenant.country.clone(),
            city: c.tenant.city.clone(),
            local_time: c.local.local_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            local_date: c.local.local_date,
            offset: c.local.offset_label(),
            is_next_day: c.date_relation == DateRelation::NextDay,
            is_prev_day: c.date_relation == DateRelation::PrevDay,
        })
        .collect();

    Ok(TimezoneDemo {
        utc_time: instant,
        description: "The same UTC instant as seen on each merchant's local clock".to_string(),
        timezones,
        summary: DemoSummary {
            total_timezones: summary.total_tenants,
            next_day_count: summary.next_day_count,
            same_day_count: summary.same_day_count,
            prev_day_count: summary.prev_day_count,
            min_offset_hours: summary.min_offset_seconds / 3600,
            max_offset_hours: summary.max_offset_seconds / 3600,
        },
    })
}
