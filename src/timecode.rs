/*!
 * Timestamp arithmetic for ASS event times.
 *
 * ASS times are written `H:MM:SS.CC` with centisecond precision. All
 * arithmetic here is integer based, so values never drift and a
 * centisecond is never rounded away.
 */

use std::fmt;
use std::ops::{Neg, Sub};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::errors::MalformedTimestamp;

// @const: ASS timestamp grammar, fraction must be exactly two digits
static ASS_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})\.(\d{2})$").expect("Invalid ASS time regex")
});

const CENTIS_PER_SECOND: u64 = 100;
const CENTIS_PER_MINUTE: u64 = 60 * CENTIS_PER_SECOND;
const CENTIS_PER_HOUR: u64 = 60 * CENTIS_PER_MINUTE;

/// Signed span of time with millisecond resolution.
///
/// Gaps between two timestamps are always whole centiseconds; the extra
/// resolution exists because thresholds are configured in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeDelta {
    millis: i64,
}

impl TimeDelta {
    /// The empty span
    pub const ZERO: TimeDelta = TimeDelta { millis: 0 };

    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn from_centis(centis: i64) -> Self {
        Self { millis: centis * 10 }
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Length in centiseconds, rounding any sub-centisecond remainder up
    pub fn centis_ceil(&self) -> i64 {
        (self.millis + 9).div_euclid(10)
    }

    pub fn is_negative(&self) -> bool {
        self.millis < 0
    }

    pub fn is_zero(&self) -> bool {
        self.millis == 0
    }
}

impl Neg for TimeDelta {
    type Output = TimeDelta;

    fn neg(self) -> Self::Output {
        TimeDelta { millis: -self.millis }
    }
}

impl Sub for TimeDelta {
    type Output = TimeDelta;

    fn sub(self, rhs: TimeDelta) -> Self::Output {
        TimeDelta { millis: self.millis - rhs.millis }
    }
}

// Serialised as whole milliseconds
impl Serialize for TimeDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.millis)
    }
}

impl fmt::Display for TimeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.millis < 0 { "-" } else { "" };
        let abs = self.millis.unsigned_abs();
        let secs = abs / 1000;
        let frac = abs % 1000;
        if frac % 10 == 0 {
            write!(f, "{}{}.{:02}s", sign, secs, frac / 10)
        } else {
            write!(f, "{}{}.{:03}s", sign, secs, frac)
        }
    }
}

/// A point in time on the subtitle timeline.
///
/// Invariant: minutes and seconds in `[0, 60)`, centiseconds in `[0, 100)`.
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    hours: u32,
    minutes: u8,
    seconds: u8,
    centis: u8,
}

impl Timestamp {
    /// Build a timestamp from its components, `None` if any is out of range
    pub fn new(hours: u32, minutes: u8, seconds: u8, centis: u8) -> Option<Self> {
        if minutes >= 60 || seconds >= 60 || centis >= 100 {
            return None;
        }
        Some(Self { hours, minutes, seconds, centis })
    }

    /// Normalise a centisecond count, carrying across every unit boundary
    pub fn from_centis(total: u64) -> Self {
        let hours = (total / CENTIS_PER_HOUR).min(u32::MAX as u64) as u32;
        let rem = total % CENTIS_PER_HOUR;
        Self {
            hours,
            minutes: (rem / CENTIS_PER_MINUTE) as u8,
            seconds: ((rem % CENTIS_PER_MINUTE) / CENTIS_PER_SECOND) as u8,
            centis: (rem % CENTIS_PER_SECOND) as u8,
        }
    }

    /// Parse an `H:MM:SS.CC` timestamp
    pub fn parse(text: &str) -> Result<Self, MalformedTimestamp> {
        let text = text.trim();
        let malformed = || MalformedTimestamp(text.to_string());

        let caps = ASS_TIME_REGEX.captures(text).ok_or_else(malformed)?;
        let field = |idx: usize| caps.get(idx).map(|m| m.as_str()).ok_or_else(malformed);

        let hours: u32 = field(1)?.parse().map_err(|_| malformed())?;
        let minutes: u8 = field(2)?.parse().map_err(|_| malformed())?;
        let seconds: u8 = field(3)?.parse().map_err(|_| malformed())?;
        let centis: u8 = field(4)?.parse().map_err(|_| malformed())?;

        Self::new(hours, minutes, seconds, centis).ok_or_else(malformed)
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn centis(&self) -> u8 {
        self.centis
    }

    /// Total centiseconds since zero
    pub fn as_centis(&self) -> u64 {
        self.hours as u64 * CENTIS_PER_HOUR
            + self.minutes as u64 * CENTIS_PER_MINUTE
            + self.seconds as u64 * CENTIS_PER_SECOND
            + self.centis as u64
    }

    /// Signed difference `self - other`
    pub fn delta(&self, other: &Timestamp) -> TimeDelta {
        TimeDelta::from_centis(self.as_centis() as i64 - other.as_centis() as i64)
    }

    /// Shift forward by `delta` (backward if negative).
    ///
    /// Sub-centisecond remainders round up; the result saturates at zero.
    pub fn add(&self, delta: TimeDelta) -> Timestamp {
        let total = self.as_centis() as i64 + delta.centis_ceil();
        Self::from_centis(total.max(0) as u64)
    }

    /// Shift backward by `delta`, saturating at zero
    pub fn subtract(&self, delta: TimeDelta) -> Timestamp {
        let total = self.as_centis() as i64 - delta.centis_ceil();
        Self::from_centis(total.max(0) as u64)
    }
}

impl Sub for Timestamp {
    type Output = TimeDelta;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.delta(&rhs)
    }
}

impl FromStr for Timestamp {
    type Err = MalformedTimestamp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Hours are written without padding: 0:00:01.50
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.centis
        )
    }
}
