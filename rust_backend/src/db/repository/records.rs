//! Raw record source trait and its query filter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use super::error::RepositoryResult;
use crate::core::domain::{RawRecord, RecordStatus, TenantId};
use crate::services::aggregation::TimeAnchor;

/// Selection criteria for [`RawRecordSource::fetch_records`].
///
/// The UTC range is half-open (`from` inclusive, `to` exclusive) and applies
/// to the instant chosen by `anchor`. Under [`TimeAnchor::Completion`] a
/// record with no completion instant never falls inside a bounded range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub anchor: TimeAnchor,
    /// `None` means all tenants.
    pub tenant_ids: Option<BTreeSet<TenantId>>,
    /// `None` means all statuses.
    pub statuses: Option<BTreeSet<RecordStatus>>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn anchored_on(mut self, anchor: TimeAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn for_tenants(mut self, ids: impl IntoIterator<Item = TenantId>) -> Self {
        self.tenant_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = RecordStatus>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn paged(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    fn anchor_instant(&self, record: &RawRecord) -> Option<DateTime<Utc>> {
        match self.anchor {
            TimeAnchor::Order => Some(record.order_time_utc),
            TimeAnchor::Completion => record.completed_time_utc,
        }
    }

    /// Whether `record` satisfies every criterion except paging.
    pub fn matches(&self, record: &RawRecord) -> bool {
        if let Some(ids) = &self.tenant_ids {
            if !ids.contains(&record.tenant_id) {
                return false;
            }
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&record.status) {
                return false;
            }
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        match self.anchor_instant(record) {
            Some(instant) => {
                self.from.map_or(true, |from| instant >= from)
                    && self.to.map_or(true, |to| instant < to)
            }
            None => false,
        }
    }
}

/// Read access to raw UTC-anchored records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait RawRecordSource: Send + Sync {
    /// Records matching `filter`, ordered by `order_time_utc` then id, with
    /// the filter's paging applied.
    async fn fetch_records(&self, filter: &RecordFilter) -> RepositoryResult<Vec<RawRecord>>;

    /// Number of records matching `filter`, ignoring paging.
    async fn count_records(&self, filter: &RecordFilter) -> RepositoryResult<usize>;
}
