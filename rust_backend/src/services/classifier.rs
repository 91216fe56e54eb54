//! Weekend and business-hour classification of local decompositions.
//!
//! Classification is a pure function of a [`LocalDecomposition`] and an
//! explicit [`BusinessWindowPolicy`]. There is no global default baked into
//! the rules: callers pass the policy, and per-tenant variations live in a
//! [`PolicyBook`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::core::domain::TenantId;
use crate::core::error::{EngineError, EngineResult};
use crate::time::LocalDecomposition;

/// Day-of-week numbering used by every policy: 0 = Sunday … 6 = Saturday.
pub const SUNDAY: u32 = 0;
pub const SATURDAY: u32 = 6;

/// Which days are weekend days and which local hours count as business hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessWindowPolicy {
    pub weekend_days: BTreeSet<u32>,
    pub business_days: BTreeSet<u32>,
    /// First business hour, inclusive.
    pub start_hour: u32,
    /// Last business hour, inclusive (18 covers 18:00–18:59).
    pub end_hour: u32,
}

impl Default for BusinessWindowPolicy {
    /// Monday–Friday 09:00–18:59, Saturday/Sunday weekend.
    fn default() -> Self {
        Self {
            weekend_days: [SUNDAY, SATURDAY].into_iter().collect(),
            business_days: (1..=5).collect(),
            start_hour: 9,
            end_hour: 18,
        }
    }
}

impl BusinessWindowPolicy {
    /// Build and validate a policy.
    pub fn new(
        weekend_days: impl IntoIterator<Item = u32>,
        business_days: impl IntoIterator<Item = u32>,
        start_hour: u32,
        end_hour: u32,
    ) -> EngineResult<Self> {
        let policy = Self {
            weekend_days: weekend_days.into_iter().collect(),
            business_days: business_days.into_iter().collect(),
            start_hour,
            end_hour,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Reject overlapping day sets, out-of-range days and reversed windows.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(day) = self
            .weekend_days
            .iter()
            .chain(self.business_days.iter())
            .find(|d| **d > SATURDAY)
        {
            return Err(EngineError::invalid_policy(format!(
                "day-of-week {} outside 0 (Sunday) ..= 6 (Saturday)",
                day
            )));
        }

        let overlap: Vec<u32> = self
            .weekend_days
            .intersection(&self.business_days)
            .copied()
            .collect();
        if !overlap.is_empty() {
            return Err(EngineError::invalid_policy(format!(
                "days {:?} are both weekend and business days",
                overlap
            )));
        }

        if self.end_hour > 23 || self.start_hour > self.end_hour {
            return Err(EngineError::invalid_policy(format!(
                "business hours {}..={} must satisfy start <= end <= 23",
                self.start_hour, self.end_hour
            )));
        }

        Ok(())
    }

    pub fn is_weekend_day(&self, day_of_week: u32) -> bool {
        self.weekend_days.contains(&day_of_week)
    }

    pub fn is_business_day(&self, day_of_week: u32) -> bool {
        self.business_days.contains(&day_of_week) && !self.is_weekend_day(day_of_week)
    }

    pub fn in_business_hours(&self, hour: u32) -> bool {
        (self.start_hour..=self.end_hour).contains(&hour)
    }
}

/// Coarse day type used as an aggregation dimension.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
}

/// Flags derived from a decomposition under a policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub is_weekend: bool,
    pub is_business_hour: bool,
    pub day_type: DayType,
}

/// Classify a local decomposition.
pub fn classify(decomp: &LocalDecomposition, policy: &BusinessWindowPolicy) -> Classification {
    let dow = decomp.local_day_of_week;
    let is_weekend = policy.is_weekend_day(dow);
    let is_business_hour = policy.is_business_day(dow) && policy.in_business_hours(decomp.local_hour);

    Classification {
        is_weekend,
        is_business_hour,
        day_type: if is_weekend {
            DayType::Weekend
        } else {
            DayType::Weekday
        },
    }
}

/// A default policy plus per-tenant overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyBook {
    default: BusinessWindowPolicy,
    overrides: HashMap<TenantId, BusinessWindowPolicy>,
}

impl PolicyBook {
    pub fn new(default: BusinessWindowPolicy) -> EngineResult<Self> {
        default.validate()?;
        Ok(Self {
            default,
            overrides: HashMap::new(),
        })
    }

    /// Register a tenant-specific policy.
    pub fn with_override(
        mut self,
        tenant_id: TenantId,
        policy: BusinessWindowPolicy,
    ) -> EngineResult<Self> {
        policy.validate()?;
        self.overrides.insert(tenant_id, policy);
        Ok(self)
    }

    pub fn default_policy(&self) -> &BusinessWindowPolicy {
        &self.default
    }

    pub fn policy_for(&self, tenant_id: TenantId) -> &BusinessWindowPolicy {
        self.overrides.get(&tenant_id).unwrap_or(&self.default)
    }
}
