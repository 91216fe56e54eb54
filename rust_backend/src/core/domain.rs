//! Domain models for tenants and their raw, UTC-anchored records.
//!
//! Tenants and raw records are owned by the storage collaborator. The engine
//! only reads them; nothing in this crate creates, mutates or persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{EngineError, EngineResult};

/// Strongly-typed identifier for a tenant (merchant).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub i64);

impl TenantId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a tenant.
///
/// Inactive and suspended tenants still resolve for projection: their
/// historical records must keep projecting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// A tenant with its single associated timezone identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    /// IANA identifier, e.g. `America/Sao_Paulo`.
    pub timezone: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TenantStatus,
}

impl Tenant {
    /// Convenience constructor used by tests and seeding code.
    pub fn new(id: i64, name: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            id: TenantId(id),
            name: name.into(),
            timezone: timezone.into(),
            country: String::new(),
            city: String::new(),
            description: String::new(),
            status: TenantStatus::Active,
        }
    }

    pub fn with_location(mut self, country: impl Into<String>, city: impl Into<String>) -> Self {
        self.country = country.into();
        self.city = city.into();
        self
    }

    pub fn with_status(mut self, status: TenantStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

/// Closed set of order statuses.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 6] = [
        RecordStatus::Pending,
        RecordStatus::Paid,
        RecordStatus::Shipped,
        RecordStatus::Delivered,
        RecordStatus::Cancelled,
        RecordStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Paid => "paid",
            RecordStatus::Shipped => "shipped",
            RecordStatus::Delivered => "delivered",
            RecordStatus::Cancelled => "cancelled",
            RecordStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RecordStatus::Pending),
            "paid" => Ok(RecordStatus::Paid),
            "shipped" => Ok(RecordStatus::Shipped),
            "delivered" => Ok(RecordStatus::Delivered),
            "cancelled" | "canceled" => Ok(RecordStatus::Cancelled),
            "refunded" => Ok(RecordStatus::Refunded),
            _ => Err(format!("Unknown record status: {}", s)),
        }
    }
}

/// A raw order record, timestamped in UTC.
///
/// `order_time_utc` is the anchor instant and the sole source of truth for
/// every derived local attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "order_id")]
    pub id: i64,
    #[serde(default)]
    pub order_number: String,
    #[serde(rename = "merchant_id")]
    pub tenant_id: TenantId,
    pub amount: f64,
    pub currency: String,
    pub status: RecordStatus,
    pub order_time_utc: DateTime<Utc>,
    /// Secondary instant (payment/completion); absent for unfinished orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_time_utc: Option<DateTime<Utc>>,
}

impl RawRecord {
    /// Check the record's data-model invariants.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(EngineError::invalid_record(
                self.id,
                format!("amount must be > 0, got {}", self.amount),
            ));
        }
        if !is_currency_code(&self.currency) {
            return Err(EngineError::invalid_record(
                self.id,
                format!(
                    "currency must be three uppercase letters, got '{}'",
                    self.currency
                ),
            ));
        }
        Ok(())
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}
