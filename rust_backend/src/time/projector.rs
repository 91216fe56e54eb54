//! Projection of UTC instants onto a tenant's local calendar.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Offset, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::registry::ResolvedZone;

/// Local calendar decomposition of one instant in one zone.
///
/// `local_date` comes from the local wall clock only and may differ from the
/// UTC calendar date of the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDecomposition {
    pub local_time: NaiveDateTime,
    pub local_date: NaiveDate,
    /// 0–23
    pub local_hour: u32,
    /// 0 = Sunday … 6 = Saturday
    pub local_day_of_week: u32,
    /// English weekday name, e.g. `Monday`
    pub local_weekday: String,
    /// Rule-derived offset at this instant, in seconds east of UTC.
    pub utc_offset_seconds: i32,
}

impl LocalDecomposition {
    pub fn weekday(&self) -> Weekday {
        self.local_time.weekday()
    }

    /// Offset formatted as `+HH:MM` / `-HH:MM`.
    pub fn offset_label(&self) -> String {
        format_offset(self.utc_offset_seconds)
    }
}

/// Project `instant` into `zone`.
///
/// Total for any instant: the offset is taken from the zone's rules at that
/// exact instant, so the same zone yields different offsets either side of a
/// DST transition.
pub fn project(instant: DateTime<Utc>, zone: &ResolvedZone) -> LocalDecomposition {
    let local = instant.with_timezone(&zone.tz());
    let utc_offset_seconds = local.offset().fix().local_minus_utc();
    let local_time = local.naive_local();
    let weekday = local_time.weekday();

    LocalDecomposition {
        local_time,
        local_date: local_time.date(),
        local_hour: local_time.hour(),
        local_day_of_week: weekday.num_days_from_sunday(),
        local_weekday: weekday_name(weekday).to_string(),
        utc_offset_seconds,
    }
}

/// Full English weekday name.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Format an offset in seconds as `±HH:MM`.
pub fn format_offset(offset_seconds: i32) -> String {
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let abs = offset_seconds.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
}
