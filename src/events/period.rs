//! # Recurrence Period
//!
//! Wire format for recurrence periods: `"<days> <hours>:<minutes>:<seconds>"`.
//! The day count is optional on input, so `"1:30:00"` means one hour and
//! thirty minutes with no whole days.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A recurrence period between occurrences of a periodic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(Duration);

/// Raised when a period string does not match the wire format
#[derive(Debug, Clone, Error)]
#[error("Invalid period '{0}': expected '<days> <h>:<m>:<s>' or '<h>:<m>:<s>'")]
pub struct PeriodParseError(String);

impl Period {
    pub fn new(duration: Duration) -> Self {
        Period(duration)
    }

    pub fn from_parts(days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        Period(
            Duration::days(days)
                + Duration::hours(hours)
                + Duration::minutes(minutes)
                + Duration::seconds(seconds),
        )
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Split into whole days plus an hours/minutes/seconds remainder
    fn to_parts(self) -> (i64, i64, i64, i64) {
        let days = self.0.num_days();
        let rem = self.0 - Duration::days(days);
        let hours = rem.num_hours();
        let minutes = rem.num_minutes() - hours * 60;
        let seconds = rem.num_seconds() - rem.num_minutes() * 60;
        (days, hours, minutes, seconds)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (days, hours, minutes, seconds) = self.to_parts();
        write!(f, "{} {}:{}:{}", days, hours, minutes, seconds)
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError(s.to_string());

        let trimmed = s.trim();
        let (days, hms) = match trimmed.split_once(' ') {
            Some((days, hms)) => (days.parse::<i64>().map_err(|_| err())?, hms),
            None => (0, trimmed),
        };

        let mut parts = hms.split(':');
        let mut next = || -> Result<i64, PeriodParseError> {
            parts
                .next()
                .and_then(|p| p.parse::<i64>().ok())
                .ok_or_else(err)
        };
        let (hours, minutes, seconds) = (next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(err());
        }

        Ok(Period::from_parts(days, hours, minutes, seconds))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
