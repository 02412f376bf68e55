//! Second resolution timestamps as carried in token claims.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Seconds since the Unix epoch, encoded as a JSON number.
///
/// The epoch itself is the zero value and is treated as unset wherever a
/// claim requires a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericDate(i64);

impl NumericDate {
    /// The zero value.
    pub const ZERO: NumericDate = NumericDate(0);

    /// The current time, truncated to whole seconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        Self(time.timestamp())
    }

    pub fn from_unix_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0
    }

    /// `None` when the seconds lie outside the range chrono can represent.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whether this time lies strictly before the current time.
    pub fn is_past(&self) -> bool {
        self.is_before(Utc::now())
    }

    /// Whether this time lies strictly after the current time.
    pub fn is_future(&self) -> bool {
        self.is_after(Utc::now())
    }

    /// Whether this time lies strictly after `time`, at full precision.
    pub(crate) fn is_after(&self, time: DateTime<Utc>) -> bool {
        self.0 > time.timestamp()
    }

    /// Whether this time lies strictly before `time`, at full precision.
    pub(crate) fn is_before(&self, time: DateTime<Utc>) -> bool {
        let seconds = time.timestamp();
        self.0 < seconds || (self.0 == seconds && time.timestamp_subsec_nanos() > 0)
    }
}

impl Add<Duration> for NumericDate {
    type Output = NumericDate;

    fn add(self, rhs: Duration) -> Self::Output {
        NumericDate(self.0.saturating_add(rhs.num_seconds()))
    }
}

impl From<DateTime<Utc>> for NumericDate {
    fn from(time: DateTime<Utc>) -> Self {
        Self::from_datetime(time)
    }
}

impl fmt::Display for NumericDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(time) => write!(f, "{}", time.to_rfc3339()),
            None => write!(f, "{}s since epoch", self.0),
        }
    }
}

/// True when the date is absent or zero.
pub(crate) fn is_unset(date: Option<NumericDate>) -> bool {
    date.is_none_or(|d| d.is_zero())
}
