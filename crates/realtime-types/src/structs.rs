//! Core value structs: host time, clock snapshots and tones.

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::enums::Meridiem;

// ---------------------------------------------------------------------------
// Host time
// ---------------------------------------------------------------------------

/// Wall-clock reading in the host's native shape.
///
/// Month is 0-based and weekday counts from Sunday (`0`), the convention
/// most host clocks expose. [`ClockSnapshot::from_host`] normalizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostTime {
    /// Full year, e.g. 2024.
    pub year: i32,
    /// Month index, 0 = January.
    pub month0: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// Day of week, 0 = Sunday.
    pub weekday_from_sunday: u32,
    /// Hour, 0-23.
    pub hour: u32,
    /// Minute, 0-59.
    pub minute: u32,
    /// Second, 0-59.
    pub second: u32,
}

impl HostTime {
    /// Decompose a `chrono` date-time in any time zone.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            year: dt.year(),
            month0: dt.month0(),
            day: dt.day(),
            weekday_from_sunday: dt.weekday().num_days_from_sunday(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock snapshot
// ---------------------------------------------------------------------------

/// One sample of the host clock, normalized for publishing.
///
/// Month is 1-12 and weekday is 1-7 with Monday = 1 and Sunday = 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockSnapshot {
    /// Full year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
    /// Day of week, 1 = Monday .. 7 = Sunday.
    pub weekday: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
}

impl ClockSnapshot {
    /// Thursday 1970-01-01 00:00:00, used before the first good sample.
    pub const EPOCH: Self = Self {
        year: 1970,
        month: 1,
        day: 1,
        weekday: 4,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Normalize a host reading.
    ///
    /// Returns `None` when any field is outside its calendar range, so a
    /// corrupt reading can be discarded in favour of the previous sample.
    pub fn from_host(time: HostTime) -> Option<Self> {
        if time.month0 >= 12
            || time.day == 0
            || time.day > 31
            || time.weekday_from_sunday >= 7
            || time.hour >= 24
            || time.minute >= 60
            || time.second >= 60
        {
            return None;
        }

        let weekday = if time.weekday_from_sunday == 0 {
            7
        } else {
            u8::try_from(time.weekday_from_sunday).ok()?
        };

        Some(Self {
            year: time.year,
            month: u8::try_from(time.month0.checked_add(1)?).ok()?,
            day: u8::try_from(time.day).ok()?,
            weekday,
            hour: u8::try_from(time.hour).ok()?,
            minute: u8::try_from(time.minute).ok()?,
            second: u8::try_from(time.second).ok()?,
        })
    }

    /// AM or PM for this snapshot's hour.
    pub fn meridiem(&self) -> Meridiem {
        Meridiem::from_hour(i64::from(self.hour))
    }
}

impl Default for ClockSnapshot {
    fn default() -> Self {
        Self::EPOCH
    }
}

// ---------------------------------------------------------------------------
// Tone
// ---------------------------------------------------------------------------

/// A four-channel screen tone: red, green, blue offsets and a gray amount.
///
/// Channels are signed and unbounded here; the renderer decides how to clamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Tone {
    /// Red offset.
    pub red: i32,
    /// Green offset.
    pub green: i32,
    /// Blue offset.
    pub blue: i32,
    /// Gray (desaturation) amount, conventionally non-negative.
    pub gray: i32,
}

/// A configured tone anchored to one hour of the day.
pub type ToneKeyframe = Tone;

impl Tone {
    /// The tone that leaves the screen untouched.
    pub const NEUTRAL: Self = Self::new(0, 0, 0, 0);

    /// Build a tone from its four channels.
    pub const fn new(red: i32, green: i32, blue: i32, gray: i32) -> Self {
        Self {
            red,
            green,
            blue,
            gray,
        }
    }

    /// Channels in `[red, green, blue, gray]` order.
    pub const fn channels(self) -> [i32; 4] {
        [self.red, self.green, self.blue, self.gray]
    }
}

impl From<[i32; 4]> for Tone {
    fn from([red, green, blue, gray]: [i32; 4]) -> Self {
        Self::new(red, green, blue, gray)
    }
}

impl From<Tone> for [i32; 4] {
    fn from(tone: Tone) -> Self {
        tone.channels()
    }
}

impl core::fmt::Display for Tone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.red, self.green, self.blue, self.gray)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;

    fn host(month0: u32, weekday_from_sunday: u32, hour: u32) -> HostTime {
        HostTime {
            year: 2024,
            month0,
            day: 15,
            weekday_from_sunday,
            hour,
            minute: 30,
            second: 5,
        }
    }

    #[test]
    fn sunday_becomes_seven() {
        let snapshot = ClockSnapshot::from_host(host(0, 0, 9)).unwrap();
        assert_eq!(snapshot.weekday, 7);
    }

    #[test]
    fn monday_stays_one_and_saturday_six() {
        assert_eq!(ClockSnapshot::from_host(host(0, 1, 9)).unwrap().weekday, 1);
        assert_eq!(ClockSnapshot::from_host(host(0, 6, 9)).unwrap().weekday, 6);
    }

    #[test]
    fn month_is_one_based() {
        assert_eq!(ClockSnapshot::from_host(host(0, 1, 9)).unwrap().month, 1);
        assert_eq!(ClockSnapshot::from_host(host(11, 1, 9)).unwrap().month, 12);
    }

    #[test]
    fn out_of_range_reading_is_rejected() {
        assert!(ClockSnapshot::from_host(host(12, 1, 9)).is_none());
        assert!(ClockSnapshot::from_host(host(0, 7, 9)).is_none());
        assert!(ClockSnapshot::from_host(host(0, 1, 24)).is_none());
    }

    #[test]
    fn host_time_from_chrono() {
        // 2024-03-10 was a Sunday.
        let offset = FixedOffset::east_opt(0).unwrap();
        let dt = offset.with_ymd_and_hms(2024, 3, 10, 18, 30, 45).unwrap();
        let time = HostTime::from_datetime(&dt);
        assert_eq!(time.month0, 2);
        assert_eq!(time.weekday_from_sunday, 0);

        let snapshot = ClockSnapshot::from_host(time).unwrap();
        assert_eq!(snapshot.month, 3);
        assert_eq!(snapshot.weekday, 7);
        assert_eq!(snapshot.hour, 18);
        assert_eq!(snapshot.second, 45);
        assert_eq!(snapshot.meridiem(), Meridiem::Pm);
    }

    #[test]
    fn tone_reads_from_yaml_list() {
        let tone: Tone = serde_yml::from_str("[68, -34, -34, 0]").unwrap();
        assert_eq!(tone, Tone::new(68, -34, -34, 0));
        assert_eq!(tone.to_string(), "[68, -34, -34, 0]");
    }
}
