//! Time-of-day / weekday gate.
//!
//! Metadata keys, all optional:
//!
//! - `start`, `end`: `HH:MM`, `HH:MM:SS`, an RFC 3339 timestamp, or
//!   `YYYY-MM-DD[ HH:MM[:SS]]` read in the window's timezone. Both bounds are
//!   inclusive. Two times of day with `start > end` describe a window that
//!   wraps midnight (`22:00` to `06:00`).
//! - `days`: weekday numbers, `0` = Sunday through `6` = Saturday. An empty
//!   list matches no day.
//! - `timezone`: IANA name; defaults to the configured timezone.
//!
//! Every clause present must pass. No clauses means the gate is open.

use std::sync::Arc;

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde_json::Value;

use super::{Metadata, Strategy, present};
use crate::clock::{Clock, SystemClock};
use crate::context::RequestContext;

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// One end of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    /// Recurring time of day.
    Time(NaiveTime),
    /// Absolute instant.
    Instant(DateTime<Utc>),
}

impl Bound {
    fn parse(value: &str, tz: Tz) -> Option<Self> {
        let value = value.trim();

        if let Some(time) = TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
        {
            return Some(Self::Time(time));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self::Instant(dt.with_timezone(&Utc)));
        }

        let local = DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;

        // Ambiguous local times (DST fall-back) take the earlier instant.
        tz.from_local_datetime(&local)
            .earliest()
            .map(|dt| Self::Instant(dt.with_timezone(&Utc)))
    }
}

/// Gates a suspension to certain hours, dates or weekdays.
#[derive(Clone)]
pub struct TimeWindowStrategy {
    default_timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl TimeWindowStrategy {
    /// Registry identifier.
    pub const IDENTIFIER: &'static str = "time_window";

    /// Create a strategy reading the system clock.
    #[must_use]
    pub fn new(default_timezone: Tz) -> Self {
        Self::with_clock(default_timezone, Arc::new(SystemClock))
    }

    /// Create a strategy reading time from `clock`.
    #[must_use]
    pub fn with_clock(default_timezone: Tz, clock: Arc<dyn Clock>) -> Self {
        Self {
            default_timezone,
            clock,
        }
    }

    fn timezone(&self, metadata: &Metadata) -> Option<Tz> {
        match present(metadata, "timezone") {
            None => Some(self.default_timezone),
            Some(Value::String(name)) => match name.trim().parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(_) => {
                    tracing::debug!(timezone = %name, "Unknown time window timezone");
                    None
                }
            },
            Some(_) => None,
        }
    }

    /// `None` means the metadata key is present but unusable.
    fn bound(metadata: &Metadata, key: &str, tz: Tz) -> Option<Option<Bound>> {
        match present(metadata, key) {
            None => Some(None),
            Some(Value::String(raw)) => match Bound::parse(raw, tz) {
                Some(bound) => Some(Some(bound)),
                None => {
                    tracing::debug!(key, value = %raw, "Unparseable time window bound");
                    None
                }
            },
            Some(_) => None,
        }
    }

    fn day_allowed(metadata: &Metadata, weekday: u32) -> bool {
        let Some(Value::Array(days)) = present(metadata, "days") else {
            return true;
        };
        days.iter().any(|day| {
            let day = match day {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            day == Some(u64::from(weekday))
        })
    }

    fn within(
        start: Option<Bound>,
        end: Option<Bound>,
        now: DateTime<Utc>,
        time_of_day: NaiveTime,
    ) -> bool {
        if let (Some(Bound::Time(start)), Some(Bound::Time(end))) = (start, end) {
            return if start <= end {
                start <= time_of_day && time_of_day <= end
            } else {
                time_of_day >= start || time_of_day <= end
            };
        }

        let after_start = match start {
            None => true,
            Some(Bound::Time(start)) => time_of_day >= start,
            Some(Bound::Instant(start)) => now >= start,
        };
        let before_end = match end {
            None => true,
            Some(Bound::Time(end)) => time_of_day <= end,
            Some(Bound::Instant(end)) => now <= end,
        };
        after_start && before_end
    }
}

impl Strategy for TimeWindowStrategy {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn matches(&self, _ctx: &RequestContext, metadata: &Metadata) -> bool {
        let Some(tz) = self.timezone(metadata) else {
            return false;
        };

        let now = self.clock.now();
        let local = now.with_timezone(&tz);

        if !Self::day_allowed(metadata, local.weekday().num_days_from_sunday()) {
            return false;
        }

        let (Some(start), Some(end)) = (
            Self::bound(metadata, "start", tz),
            Self::bound(metadata, "end", tz),
        ) else {
            return false;
        };

        let time_of_day = local.time().with_nanosecond(0).unwrap_or_else(|| local.time());
        Self::within(start, end, now, time_of_day)
    }
}
