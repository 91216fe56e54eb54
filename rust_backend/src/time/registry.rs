//! Timezone identifier validation and resolution.
//!
//! The registry never parses zone rules itself: it delegates to a
//! [`ZoneRuleSource`] (by default the IANA database compiled into
//! `chrono-tz`) and memoises successful lookups. The cache is purely an
//! optimisation; results are identical with or without it.

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::error::{EngineError, EngineResult};

/// Source of offset-at-instant rules for a zone identifier.
///
/// Implementations must be pure lookups: the same identifier always yields
/// the same rules.
pub trait ZoneRuleSource: Send + Sync {
    /// Return the rules for `identifier`, or `None` if it is not a known zone.
    fn rules_for(&self, identifier: &str) -> Option<Tz>;
}

/// The IANA zone database shipped with `chrono-tz`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IanaZoneSource;

impl ZoneRuleSource for IanaZoneSource {
    fn rules_for(&self, identifier: &str) -> Option<Tz> {
        identifier.parse::<Tz>().ok()
    }
}

/// A zone identifier that has been validated against the rule source.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ResolvedZone {
    tz: Tz,
}

impl ResolvedZone {
    /// The canonical identifier, e.g. `Asia/Tokyo`.
    pub fn identifier(&self) -> &'static str {
        self.tz.name()
    }

    /// The underlying rule set.
    pub fn tz(&self) -> Tz {
        self.tz
    }
}

impl fmt::Debug for ResolvedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolvedZone({})", self.identifier())
    }
}

impl fmt::Display for ResolvedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl Serialize for ResolvedZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.identifier())
    }
}

/// Resolves identifiers to [`ResolvedZone`]s.
///
/// Safe for concurrent use: lookups take a shared read lock and only a cache
/// miss briefly takes the write lock.
pub struct TimezoneRegistry {
    source: Box<dyn ZoneRuleSource>,
    cache: RwLock<HashMap<String, ResolvedZone>>,
}

static SHARED: Lazy<Arc<TimezoneRegistry>> = Lazy::new(|| Arc::new(TimezoneRegistry::new()));

impl TimezoneRegistry {
    /// Create a registry backed by the IANA database.
    pub fn new() -> Self {
        Self::with_source(IanaZoneSource)
    }

    /// Create a registry backed by a custom rule source.
    pub fn with_source(source: impl ZoneRuleSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide registry backed by the IANA database.
    ///
    /// Every caller gets a handle to the same cache.
    pub fn shared() -> Arc<TimezoneRegistry> {
        Arc::clone(&SHARED)
    }

    /// Resolve an identifier.
    ///
    /// # Errors
    /// [`EngineError::InvalidTimezone`] if the rule source does not know the
    /// identifier. Failures are never cached and never replaced by UTC.
    pub fn resolve(&self, identifier: &str) -> EngineResult<ResolvedZone> {
        if let Some(zone) = self.cache.read().get(identifier) {
            return Ok(*zone);
        }

        let tz = self
            .source
            .rules_for(identifier)
            .ok_or_else(|| EngineError::invalid_timezone(identifier))?;
        let zone = ResolvedZone { tz };

        self.cache.write().insert(identifier.to_string(), zone);
        Ok(zone)
    }

    /// Whether the identifier resolves.
    pub fn is_valid(&self, identifier: &str) -> bool {
        self.resolve(identifier).is_ok()
    }

    /// Number of memoised identifiers.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }
}

impl Default for TimezoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimezoneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimezoneRegistry")
            .field("cached", &self.cached_len())
            .finish()
    }
}
