//! Grouping and ranking of projected records by derived dimensions.
//!
//! Records are first filtered by an explicit allowed-status set, then keyed
//! by the requested dimension tuple. Groups come back sorted by that tuple so
//! results are reproducible regardless of input order.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::domain::{RecordStatus, TenantId};
use crate::services::classifier::DayType;
use crate::services::projection::{ProjectedInstant, ProjectedRecord};

/// A derived attribute records can be grouped by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    LocalDate,
    LocalHour,
    Timezone,
    TenantId,
    DayType,
}

impl Dimension {
    /// Whether the dimension is derived from the anchored local time.
    pub fn requires_local_time(&self) -> bool {
        matches!(
            self,
            Dimension::LocalDate | Dimension::LocalHour | Dimension::DayType
        )
    }
}

/// The value of one dimension for one record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum DimensionValue {
    LocalDate(NaiveDate),
    LocalHour(u32),
    Timezone(String),
    TenantId(TenantId),
    DayType(DayType),
}

/// Which instant of a record local-time dimensions are derived from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeAnchor {
    /// `order_time_utc`; always present.
    #[default]
    Order,
    /// `completed_time_utc`; records without one are left out of any grouping
    /// that needs local time.
    Completion,
}

/// Caller-supplied aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOptions {
    /// Only records in these statuses contribute to any aggregate.
    pub allowed_statuses: BTreeSet<RecordStatus>,
    #[serde(default)]
    pub anchor: TimeAnchor,
}

impl AggregationOptions {
    pub fn new(allowed_statuses: impl IntoIterator<Item = RecordStatus>) -> Self {
        Self {
            allowed_statuses: allowed_statuses.into_iter().collect(),
            anchor: TimeAnchor::Order,
        }
    }

    /// Paid, shipped and delivered orders.
    pub fn completed_orders() -> Self {
        Self::new([
            RecordStatus::Paid,
            RecordStatus::Shipped,
            RecordStatus::Delivered,
        ])
    }

    pub fn with_anchor(mut self, anchor: TimeAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    fn admits(&self, record: &ProjectedRecord) -> bool {
        self.allowed_statuses.contains(&record.status())
    }

    fn anchored<'r>(&self, record: &'r ProjectedRecord) -> Option<&'r ProjectedInstant> {
        match self.anchor {
            TimeAnchor::Order => Some(&record.order),
            TimeAnchor::Completion => record.completion.as_ref(),
        }
    }
}

/// One group of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateGroup {
    /// Values in the same order as [`AggregationResult::dimensions`].
    pub key: Vec<DimensionValue>,
    pub count: usize,
    pub total_amount: f64,
    pub avg_amount: f64,
}

/// Grouped output, sorted ascending by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub dimensions: Vec<Dimension>,
    pub groups: Vec<AggregateGroup>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    pub fn total_amount(&self) -> f64 {
        self.groups.iter().map(|g| g.total_amount).sum()
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    total: f64,
}

impl Accumulator {
    fn push(&mut self, amount: f64) {
        self.count += 1;
        self.total += amount;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

fn dimension_value(
    dimension: Dimension,
    record: &ProjectedRecord,
    anchored: Option<&ProjectedInstant>,
) -> Option<DimensionValue> {
    match dimension {
        Dimension::Timezone => Some(DimensionValue::Timezone(record.timezone.clone())),
        Dimension::TenantId => Some(DimensionValue::TenantId(record.tenant_id())),
        Dimension::LocalDate => anchored.map(|a| DimensionValue::LocalDate(a.local.local_date)),
        Dimension::LocalHour => anchored.map(|a| DimensionValue::LocalHour(a.local.local_hour)),
        Dimension::DayType => anchored.map(|a| DimensionValue::DayType(a.classification.day_type)),
    }
}

/// Key a record by `dimensions`, or `None` if it is filtered out.
fn group_key(
    record: &ProjectedRecord,
    dimensions: &[Dimension],
    options: &AggregationOptions,
) -> Option<Vec<DimensionValue>> {
    if !options.admits(record) {
        return None;
    }
    let anchored = options.anchored(record);
    dimensions
        .iter()
        .map(|d| dimension_value(*d, record, anchored))
        .collect()
}

/// Drop repeated dimensions, keeping first occurrences in order.
fn normalise_dimensions(dimensions: &[Dimension]) -> Vec<Dimension> {
    let mut seen = Vec::with_capacity(dimensions.len());
    for d in dimensions {
        if !seen.contains(d) {
            seen.push(*d);
        }
    }
    seen
}

/// Group `records` by `dimensions` and compute count, sum and mean amount.
///
/// With no dimensions every admitted record falls into a single group with an
/// empty key. Empty input yields an empty result.
pub fn aggregate(
    records: &[ProjectedRecord],
    dimensions: &[Dimension],
    options: &AggregationOptions,
) -> AggregationResult {
    let dimensions = normalise_dimensions(dimensions);
    let mut groups: BTreeMap<Vec<DimensionValue>, Accumulator> = BTreeMap::new();

    for record in records {
        if let Some(key) = group_key(record, &dimensions, options) {
            groups.entry(key).or_default().push(record.amount());
        }
    }

    debug!(
        "Aggregated {} records into {} groups by {:?}",
        records.len(),
        groups.len(),
        dimensions
    );

    AggregationResult {
        dimensions,
        groups: groups
            .into_iter()
            .map(|(key, acc)| AggregateGroup {
                key,
                count: acc.count,
                total_amount: acc.total,
                avg_amount: acc.mean(),
            })
            .collect(),
    }
}

/// Per-tenant totals used for rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantRanking {
    pub merchant_id: TenantId,
    pub merchant_name: String,
    pub timezone: String,
    pub order_count: usize,
    pub total_amount: f64,
    pub avg_amount: f64,
}

/// Top `n` tenants by summed amount, descending; ties by ascending tenant id.
pub fn top_n(
    records: &[ProjectedRecord],
    n: usize,
    options: &AggregationOptions,
) -> Vec<TenantRanking> {
    let mut totals: BTreeMap<TenantId, (Accumulator, &ProjectedRecord)> = BTreeMap::new();
    for record in records.iter().filter(|r| options.admits(r)) {
        totals
            .entry(record.tenant_id())
            .or_insert_with(|| (Accumulator::default(), record))
            .0
            .push(record.amount());
    }

    let mut ranking: Vec<TenantRanking> = totals
        .into_iter()
        .map(|(merchant_id, (acc, first))| TenantRanking {
            merchant_id,
            merchant_name: first.merchant_name.clone(),
            timezone: first.timezone.clone(),
            order_count: acc.count,
            total_amount: acc.total,
            avg_amount: acc.mean(),
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.total_amount
            .total_cmp(&a.total_amount)
            .then_with(|| a.merchant_id.cmp(&b.merchant_id))
    });
    ranking.truncate(n);
    ranking
}

/// Orders per local hour of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyBreakdown {
    pub hour: u32,
    pub order_count: usize,
    pub total_amount: f64,
    pub avg_amount: f64,
}

/// Orders per timezone and country of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimezoneStats {
    pub timezone: String,
    pub country: String,
    pub order_count: usize,
    pub total_amount: f64,
    pub avg_amount: f64,
}

/// Full report for one local calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAnalysis {
    pub date: NaiveDate,
    pub total_orders: usize,
    pub total_amount: f64,
    pub hourly_breakdown: Vec<HourlyBreakdown>,
    pub timezone_stats: Vec<TimezoneStats>,
    pub top_merchants: Vec<TenantRanking>,
}

/// Summarise the records whose anchored local date is `date`.
///
/// Each merchant's records are counted on their own local calendar, so one
/// report may span more than 24 UTC hours.
pub fn analyze_date(
    records: &[ProjectedRecord],
    date: NaiveDate,
    options: &AggregationOptions,
    top: usize,
) -> DailyAnalysis {
    let day: Vec<ProjectedRecord> = records
        .iter()
        .filter(|r| {
            options
                .anchored(r)
                .is_some_and(|a| a.local.local_date == date)
        })
        .cloned()
        .collect();

    let overall = aggregate(&day, &[], options);

    let hourly_breakdown = aggregate(&day, &[Dimension::LocalHour], options)
        .groups
        .into_iter()
        .filter_map(|g| match g.key.first() {
            Some(DimensionValue::LocalHour(hour)) => Some(HourlyBreakdown {
                hour: *hour,
                order_count: g.count,
                total_amount: g.total_amount,
                avg_amount: g.avg_amount,
            }),
            _ => None,
        })
        .collect();

    let mut by_zone: BTreeMap<(&str, &str), Vec<ProjectedRecord>> = BTreeMap::new();
    for r in &day {
        by_zone
            .entry((r.timezone.as_str(), r.country.as_str()))
            .or_default()
            .push(r.clone());
    }
    let mut timezone_stats: Vec<TimezoneStats> = by_zone
        .into_iter()
        .flat_map(|((timezone, country), rows)| {
            aggregate(&rows, &[], options)
                .groups
                .into_iter()
                .map(move |g| TimezoneStats {
                    timezone: timezone.to_string(),
                    country: country.to_string(),
                    order_count: g.count,
                    total_amount: g.total_amount,
                    avg_amount: g.avg_amount,
                })
        })
        .collect();
    timezone_stats.sort_by(|a, b| match b.total_amount.total_cmp(&a.total_amount) {
        Ordering::Equal => (&a.timezone, &a.country).cmp(&(&b.timezone, &b.country)),
        other => other,
    });

    DailyAnalysis {
        date,
        total_orders: overall.total_count(),
        total_amount: overall.total_amount(),
        hourly_breakdown,
        timezone_stats,
        top_merchants: top_n(&day, top, options),
    }
}
