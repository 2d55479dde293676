//! Time-To-Live Module
//!
//! Expiration directives accepted by cache writes, and their conversion to
//! absolute unix timestamps.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Months, TimeDelta, Utc};

use crate::error::{CacheError, Result};

// == Ttl ==
/// Expiration directive for a cache write.
///
/// A write without a `Ttl` leaves expiration to the store's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Whole seconds from now. Negative values are rejected by validation.
    Seconds(i64),
    /// Calendar-aware interval from now.
    Interval(TtlInterval),
}

impl Ttl {
    // == Absolute Expiration ==
    /// Computes the absolute unix timestamp (seconds) at which an entry
    /// written at `now` expires.
    ///
    /// A positive TTL rounds up to the next whole second, so the entry lives
    /// at least as long as requested. A zero TTL expires at `now`.
    ///
    /// # Errors
    /// `CacheError::InvalidTtl` if the TTL is negative or the resulting
    /// instant is not representable.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Result<i64> {
        let instant = match self {
            Ttl::Seconds(secs) if *secs < 0 => {
                return Err(CacheError::InvalidTtl(format!(
                    "TTL must not be negative, got {secs} seconds"
                )));
            }
            Ttl::Seconds(secs) => {
                TimeDelta::try_seconds(*secs).and_then(|delta| now.checked_add_signed(delta))
            }
            Ttl::Interval(interval) => interval.add_to(now),
        };

        let at = instant
            .ok_or_else(|| CacheError::InvalidTtl(format!("TTL {self} is out of range")))?;

        if at == now || at.timestamp_subsec_nanos() == 0 {
            return Ok(at.timestamp());
        }
        at.timestamp()
            .checked_add(1)
            .ok_or_else(|| CacheError::InvalidTtl(format!("TTL {self} is out of range")))
    }
}

/// Fractional seconds round up, so a positive duration never expires on write.
impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        let secs = duration
            .as_secs()
            .saturating_add(u64::from(duration.subsec_nanos() > 0));
        Ttl::Seconds(i64::try_from(secs).unwrap_or(i64::MAX))
    }
}

/// Fractional seconds of a positive delta round up, as for `Duration`.
impl From<TimeDelta> for Ttl {
    fn from(delta: TimeDelta) -> Self {
        let secs = delta.num_seconds();
        if delta.subsec_nanos() > 0 {
            Ttl::Seconds(secs.saturating_add(1))
        } else {
            Ttl::Seconds(secs)
        }
    }
}

impl From<TtlInterval> for Ttl {
    fn from(interval: TtlInterval) -> Self {
        Ttl::Interval(interval)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Seconds(secs) => write!(f, "{secs}s"),
            Ttl::Interval(interval) => write!(f, "{interval}"),
        }
    }
}

// == Parsing ==
/// Parses either a plain number of seconds (`"3600"`) or a relative
/// phrase made of `<count> <unit>` pairs (`"1 day"`, `"2 hours 30 minutes"`).
impl FromStr for Ttl {
    type Err = CacheError;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if let Ok(secs) = trimmed.parse::<i64>() {
            return Ok(Ttl::Seconds(secs));
        }

        let tokens: Vec<&str> = trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty() && *t != "and")
            .collect();

        if tokens.is_empty() || tokens.len() % 2 != 0 {
            return Err(CacheError::InvalidTtl(format!("cannot parse TTL '{input}'")));
        }

        let mut interval = TtlInterval::default();
        for pair in tokens.chunks(2) {
            let count: u32 = pair[0].trim_start_matches('+').parse().map_err(|_| {
                CacheError::InvalidTtl(format!("invalid count '{}' in TTL '{input}'", pair[0]))
            })?;
            interval
                .accumulate(pair[1], count)
                .ok_or_else(|| {
                    CacheError::InvalidTtl(format!("invalid unit '{}' in TTL '{input}'", pair[1]))
                })?;
        }

        Ok(Ttl::Interval(interval))
    }
}

// == Ttl Interval ==
/// Structured duration, added to "now" with calendar arithmetic for the
/// year and month components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtlInterval {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TtlInterval {
    /// Creates an empty interval.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    pub fn months(mut self, months: u32) -> Self {
        self.months = months;
        self
    }

    pub fn days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn hours(mut self, hours: u32) -> Self {
        self.hours = hours;
        self
    }

    pub fn minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn seconds(mut self, seconds: u32) -> Self {
        self.seconds = seconds;
        self
    }

    // == Add To ==
    /// Adds the interval to `instant`, returning None on overflow.
    pub fn add_to(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let clock = TimeDelta::try_days(i64::from(self.days))?
            .checked_add(&TimeDelta::try_hours(i64::from(self.hours))?)?
            .checked_add(&TimeDelta::try_minutes(i64::from(self.minutes))?)?
            .checked_add(&TimeDelta::try_seconds(i64::from(self.seconds))?)?;

        instant
            .checked_add_months(Months::new(months))?
            .checked_add_signed(clock)
    }

    /// Adds `count` of the named unit. Returns None for unknown units or overflow.
    fn accumulate(&mut self, unit: &str, count: u32) -> Option<()> {
        let unit = unit.to_ascii_lowercase();
        // Only a single plural 's' is dropped; "ms" must not read as minutes
        let singular = match unit.as_str() {
            "s" | "ms" => unit.as_str(),
            plural => plural.strip_suffix('s').unwrap_or(plural),
        };
        let (field, count) = match singular {
            "year" | "yr" => (&mut self.years, count),
            "month" | "mon" => (&mut self.months, count),
            "week" | "wk" => (&mut self.days, count.checked_mul(7)?),
            "day" => (&mut self.days, count),
            "hour" | "hr" | "h" => (&mut self.hours, count),
            "minute" | "min" | "m" => (&mut self.minutes, count),
            "second" | "sec" | "s" => (&mut self.seconds, count),
            _ => return None,
        };
        *field = field.checked_add(count)?;
        Some(())
    }
}

impl fmt::Display for TtlInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}y {}mo {}d {}h {}m {}s",
            self.years, self.months, self.days, self.hours, self.minutes, self.seconds
        )
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_seconds_expiration() {
        let now = fixed_now();
        let at = Ttl::Seconds(3600).expires_at(now).unwrap();
        assert_eq!(at, now.timestamp() + 3600);
    }

    #[test]
    fn test_zero_seconds_expires_now() {
        let now = fixed_now();
        assert_eq!(Ttl::Seconds(0).expires_at(now).unwrap(), now.timestamp());
    }

    #[test]
    fn test_positive_ttl_rounds_up_to_whole_second() {
        let now = fixed_now() + TimeDelta::milliseconds(999);
        assert_eq!(
            Ttl::Seconds(1).expires_at(now).unwrap(),
            fixed_now().timestamp() + 2
        );
        assert_eq!(Ttl::Seconds(0).expires_at(now).unwrap(), now.timestamp());
    }

    #[test]
    fn test_negative_seconds_rejected() {
        let result = Ttl::Seconds(-1).expires_at(fixed_now());
        assert!(matches!(result, Err(CacheError::InvalidTtl(_))));
    }

    #[test]
    fn test_huge_seconds_rejected() {
        let result = Ttl::Seconds(i64::MAX).expires_at(fixed_now());
        assert!(matches!(result, Err(CacheError::InvalidTtl(_))));
    }

    #[test]
    fn test_interval_uses_calendar_months() {
        // Jan 31 + 1 month clamps to Feb 29 in a leap year
        let now = fixed_now();
        let ttl = Ttl::Interval(TtlInterval::new().months(1));
        let expected = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(ttl.expires_at(now).unwrap(), expected.timestamp());
    }

    #[test]
    fn test_interval_mixed_units() {
        let now = fixed_now();
        let ttl = Ttl::Interval(TtlInterval::new().days(1).hours(2).minutes(3).seconds(4));
        let expected = now.timestamp() + 86_400 + 2 * 3600 + 3 * 60 + 4;
        assert_eq!(ttl.expires_at(now).unwrap(), expected);
    }

    #[test]
    fn test_interval_overflow_rejected() {
        let ttl = Ttl::Interval(TtlInterval::new().years(u32::MAX));
        assert!(matches!(
            ttl.expires_at(fixed_now()),
            Err(CacheError::InvalidTtl(_))
        ));
    }

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!("3600".parse::<Ttl>().unwrap(), Ttl::Seconds(3600));
        assert_eq!(" 42 ".parse::<Ttl>().unwrap(), Ttl::Seconds(42));
    }

    #[test]
    fn test_parse_relative_phrase() {
        let ttl: Ttl = "1 day".parse().unwrap();
        assert_eq!(ttl, Ttl::Interval(TtlInterval::new().days(1)));

        let ttl: Ttl = "2 hours, 30 minutes".parse().unwrap();
        assert_eq!(ttl, Ttl::Interval(TtlInterval::new().hours(2).minutes(30)));

        let ttl: Ttl = "1 year and 2 weeks".parse().unwrap();
        assert_eq!(ttl, Ttl::Interval(TtlInterval::new().years(1).days(14)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in [
            "",
            "soon",
            "1 fortnight",
            "day 1",
            "1 day 2",
            "-1 day",
            "500 ms",
            "5 hourss",
        ] {
            let result = input.parse::<Ttl>();
            assert!(
                matches!(result, Err(CacheError::InvalidTtl(_))),
                "expected '{input}' to be rejected"
            );
        }
    }

    #[test]
    fn test_from_std_duration() {
        let ttl: Ttl = Duration::from_secs(90).into();
        assert_eq!(ttl, Ttl::Seconds(90));

        let ttl: Ttl = Duration::from_millis(90_500).into();
        assert_eq!(ttl, Ttl::Seconds(91));
    }

    #[test]
    fn test_sub_second_duration_rounds_up() {
        let ttl: Ttl = Duration::from_millis(900).into();
        assert_eq!(ttl, Ttl::Seconds(1));

        let ttl: Ttl = Duration::from_nanos(1).into();
        assert_eq!(ttl, Ttl::Seconds(1));

        let ttl: Ttl = Duration::ZERO.into();
        assert_eq!(ttl, Ttl::Seconds(0));
    }

    #[test]
    fn test_from_chrono_delta() {
        let ttl: Ttl = TimeDelta::minutes(5).into();
        assert_eq!(ttl, Ttl::Seconds(300));

        let ttl: Ttl = TimeDelta::milliseconds(900).into();
        assert_eq!(ttl, Ttl::Seconds(1));

        let ttl: Ttl = TimeDelta::milliseconds(-1500).into();
        assert_eq!(ttl, Ttl::Seconds(-1));
    }

    #[test]
    fn test_parse_unit_spellings() {
        let ttl: Ttl = "3 hrs 5 mins 10 s".parse().unwrap();
        assert_eq!(
            ttl,
            Ttl::Interval(TtlInterval::new().hours(3).minutes(5).seconds(10))
        );

        let ttl: Ttl = "45 secs".parse().unwrap();
        assert_eq!(ttl, Ttl::Interval(TtlInterval::new().seconds(45)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Ttl::Seconds(10).to_string(), "10s");
        assert_eq!(
            Ttl::Interval(TtlInterval::new().days(1)).to_string(),
            "0y 0mo 1d 0h 0m 0s"
        );
    }
}
