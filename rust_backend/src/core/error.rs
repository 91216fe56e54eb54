//! Error types for the projection and aggregation engine.
//!
//! Every variant describes a problem with caller-supplied input. The engine
//! never retries and never substitutes a fallback value (for example UTC for
//! an unknown zone); errors are surfaced verbatim to the request layer.

use super::domain::TenantId;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for engine operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The identifier is not a zone known to the rule database.
    #[error("Invalid timezone: '{identifier}'")]
    InvalidTimezone { identifier: String },

    /// A record in a batch references a tenant missing from the supplied mapping.
    #[error("Unknown tenant: {tenant_id} (referenced by record {record_id})")]
    UnknownTenant { tenant_id: TenantId, record_id: i64 },

    /// The comparator was called with no tenants.
    #[error("Empty tenant set: comparison requires at least one tenant")]
    EmptyTenantSet,

    /// A local date string is not `YYYY-MM-DD`.
    #[error("Invalid date format: '{input}' (expected YYYY-MM-DD): {reason}")]
    InvalidDateFormat { input: String, reason: String },

    /// An instant string is not RFC 3339.
    #[error("Invalid instant format: '{input}' (expected RFC 3339): {reason}")]
    InvalidInstantFormat { input: String, reason: String },

    /// A raw record violates its data-model invariants.
    #[error("Invalid record {record_id}: {reason}")]
    InvalidRecord { record_id: i64, reason: String },

    /// A business-window policy is internally inconsistent.
    #[error("Invalid business window policy: {reason}")]
    InvalidPolicy { reason: String },
}

impl EngineError {
    pub fn invalid_timezone(identifier: impl Into<String>) -> Self {
        Self::InvalidTimezone {
            identifier: identifier.into(),
        }
    }

    pub fn invalid_date(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidDateFormat {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_instant(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidInstantFormat {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_record(record_id: i64, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            record_id,
            reason: reason.into(),
        }
    }

    pub fn invalid_policy(reason: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for the request layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTimezone { .. } => "INVALID_TIMEZONE",
            Self::UnknownTenant { .. } => "UNKNOWN_TENANT",
            Self::EmptyTenantSet => "EMPTY_TENANT_SET",
            Self::InvalidDateFormat { .. } => "INVALID_DATE_FORMAT",
            Self::InvalidInstantFormat { .. } => "INVALID_INSTANT_FORMAT",
            Self::InvalidRecord { .. } => "INVALID_RECORD",
            Self::InvalidPolicy { .. } => "INVALID_POLICY",
        }
    }

    /// Every engine error stems from caller-supplied input.
    pub fn is_caller_error(&self) -> bool {
        true
    }

    pub fn is_retryable(&self) -> bool {
        false
    }
}
