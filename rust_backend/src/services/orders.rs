//! Paged listing of projected orders.

use serde::{Deserialize, Serialize};

use crate::core::error::EngineResult;
use crate::services::projection::ProjectedRecord;
use crate::time::TimezoneRegistry;

/// Query parameters for [`list_orders`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuery {
    /// Only orders of tenants in this zone. Must be a valid identifier.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Non-positive or missing values fall back to the default limit.
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl OrderQuery {
    pub fn in_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Limits applied to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListingOptions {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

fn default_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    1000
}

impl Default for OrderListingOptions {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl OrderListingOptions {
    fn effective_limit(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 => (n as usize).min(self.max_limit),
            _ => self.default_limit.min(self.max_limit),
        }
    }
}

/// One page of orders plus the size of the unpaged result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPage {
    pub orders: Vec<ProjectedRecord>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Filter, order newest first and page `records`.
///
/// Ties on `order_time_utc` are broken by descending order id.
///
/// # Errors
/// [`EngineError::InvalidTimezone`](crate::core::error::EngineError::InvalidTimezone)
/// when the filter names an unknown zone.
pub fn list_orders(
    records: Vec<ProjectedRecord>,
    query: &OrderQuery,
    options: &OrderListingOptions,
    registry: &TimezoneRegistry,
) -> EngineResult<OrderPage> {
    let filter = match query.timezone.as_deref().map(str::trim) {
        Some(tz) if !tz.is_empty() => Some(registry.resolve(tz)?),
        _ => None,
    };

    let mut matching: Vec<ProjectedRecord> = match filter {
        Some(zone) => records
            .into_iter()
            .filter(|r| {
                registry
                    .resolve(&r.timezone)
                    .is_ok_and(|z| z.identifier() == zone.identifier())
            })
            .collect(),
        None => records,
    };

    matching.sort_by(|a, b| {
        b.record
            .order_time_utc
            .cmp(&a.record.order_time_utc)
            .then_with(|| b.record.id.cmp(&a.record.id))
    });

    let total = matching.len();
    let limit = options.effective_limit(query.limit);
    let offset = query.offset.filter(|o| *o > 0).unwrap_or(0) as usize;

    let orders = matching.into_iter().skip(offset).take(limit).collect();
    Ok(OrderPage {
        orders,
        total,
        limit,
        offset,
    })
}
