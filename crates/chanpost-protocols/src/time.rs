//! Wall-clock time-of-day and the fixed zone it is interpreted in.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScheduleError;

/// A 24h wall-clock time (HH:MM), the only time unit jobs are keyed by.
///
/// Serialized as the `"HH:MM"` string used by the on-disk schedule format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Create a time-of-day, rejecting out-of-range fields.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTimeOfDay(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Hour, 0-23.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute, 0-59.
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Convert to a chrono time with seconds zeroed.
    pub fn to_naive_time(self) -> NaiveTime {
        // Fields are range-checked at construction.
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap_or_default()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ScheduleError::InvalidTimeOfDay(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(err)?;
        let hour: u8 = h.trim().parse().map_err(|_| err())?;
        let minute: u8 = m.trim().parse().map_err(|_| err())?;
        TimeOfDay::new(hour, minute).map_err(|_| err())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The fixed UTC offset all time-of-day values are interpreted against.
///
/// Deliberately a fixed offset rather than a named timezone: daily jobs
/// re-arm on a flat 24h period, so a DST shift shows up as drift and is
/// not corrected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone(FixedOffset);

impl Zone {
    /// IST (+05:30), the zone of the original deployment and the default.
    pub fn ist() -> Self {
        Self(FixedOffset::east_opt(19_800).expect("+05:30 is in range"))
    }

    /// The underlying chrono offset.
    pub fn fixed_offset(&self) -> FixedOffset {
        self.0
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::ist()
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Self(offset)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.local_minus_utc();
        let sign = if secs < 0 { '-' } else { '+' };
        let abs = secs.abs();
        write!(f, "{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
    }
}

impl FromStr for Zone {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ScheduleError::InvalidZone(s.to_string());
        let (sign, rest) = match s.split_at_checked(1) {
            Some(("+", rest)) => (1i32, rest),
            Some(("-", rest)) => (-1i32, rest),
            _ => return Err(err()),
        };
        let (h, m) = rest.split_once(':').ok_or_else(err)?;
        let hours: i32 = h.parse().map_err(|_| err())?;
        let minutes: i32 = m.parse().map_err(|_| err())?;
        if hours > 23 || minutes > 59 {
            return Err(err());
        }
        let secs = sign * (hours * 3600 + minutes * 60);
        FixedOffset::east_opt(secs).map(Self).ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_new() {
        let t = TimeOfDay::new(9, 30).unwrap();
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.to_string(), "09:30");
    }

    #[test]
    fn test_time_of_day_rejects_out_of_range() {
        assert!(TimeOfDay::new(24, 0).is_err());
        assert!(TimeOfDay::new(0, 60).is_err());
        assert!(TimeOfDay::new(23, 59).is_ok());
    }

    #[test]
    fn test_time_of_day_parse() {
        assert_eq!("09:00".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(9, 0).unwrap());
        assert_eq!("23:59".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(23, 59).unwrap());
        // Unpadded fields are accepted, matching the original bot's parser.
        assert_eq!("9:5".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(9, 5).unwrap());
    }

    #[test]
    fn test_time_of_day_parse_rejects_malformed() {
        for input in ["", "0900", "9", "24:00", "12:60", "ab:cd", "12:", ":30", "-1:00"] {
            assert!(
                input.parse::<TimeOfDay>().is_err(),
                "'{input}' should be rejected"
            );
        }
    }

    #[test]
    fn test_time_of_day_serde_round_trip() {
        let t = TimeOfDay::new(13, 5).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"13:05\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_zone_default_is_ist() {
        let zone = Zone::default();
        assert_eq!(zone.to_string(), "+05:30");
        assert_eq!(zone.fixed_offset().local_minus_utc(), 19_800);
    }

    #[test]
    fn test_zone_parse() {
        assert_eq!("+05:30".parse::<Zone>().unwrap(), Zone::ist());
        assert_eq!(
            "-08:00".parse::<Zone>().unwrap().fixed_offset().local_minus_utc(),
            -8 * 3600
        );
        assert_eq!("+00:00".parse::<Zone>().unwrap().to_string(), "+00:00");
    }

    #[test]
    fn test_zone_parse_rejects_malformed() {
        for input in ["", "05:30", "+5", "+24:00", "+05:60", "+xx:yy"] {
            assert!(input.parse::<Zone>().is_err(), "'{input}' should be rejected");
        }
    }
}
