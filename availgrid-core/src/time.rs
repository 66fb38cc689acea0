//! Time codec between the stored 24-hour `HH:MM` form and the 12-hour form
//! used for display and editing.
//!
//! Hours 0 and 12 both show as 12. The meridiem is AM for hours below 12 and
//! PM otherwise, so 12:00 is "12:00 PM" and 00:00 is "12:00 AM".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimeError;

/// Minutes offered when editing a time.
pub const MINUTE_STEPS: [u8; 12] = [0, 5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55];

/// Hours in the order a 12-hour picker lists them.
pub const HOUR_STEPS: [u8; 12] = [12, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meridiem {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Meridiem {
    pub fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Meridiem::Am => Meridiem::Pm,
            Meridiem::Pm => Meridiem::Am,
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Meridiem {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Meridiem::Am),
            "PM" => Ok(Meridiem::Pm),
            _ => Err(TimeError::Meridiem(s.to_string())),
        }
    }
}

/// A wall-clock time as stored and sent over the wire (`HH:MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time24 {
    hour: u8,
    minute: u8,
}

impl Time24 {
    pub fn new(hour: u8, minute: u8) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeError::MinuteOutOfRange(minute));
        }
        Ok(Self { hour, minute })
    }

    /// Const constructor for fixed times. Panics on an out-of-range value.
    pub const fn from_hm(hour: u8, minute: u8) -> Self {
        assert!(hour < 24 && minute < 60, "time out of range");
        Self { hour, minute }
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn minutes_since_midnight(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    pub fn to_12h(self) -> Time12 {
        let hour = match self.hour {
            0 => 12,
            h @ 1..=12 => h,
            h => h - 12,
        };
        let meridiem = if self.hour < 12 {
            Meridiem::Am
        } else {
            Meridiem::Pm
        };
        Time12 {
            hour,
            minute: self.minute,
            meridiem,
        }
    }

    /// Read-only rendering, e.g. `9:05 AM`.
    pub fn display(self) -> String {
        self.to_12h().to_string()
    }
}

impl fmt::Display for Time24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for Time24 {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeError::Malformed(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(malformed)?;
        let digits = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
        };
        // Minutes are always two digits; a single-digit hour is tolerated.
        if !digits(h, 2) || !digits(m, 2) || m.len() != 2 {
            return Err(malformed());
        }
        let hour = h.parse().map_err(|_| malformed())?;
        let minute = m.parse().map_err(|_| malformed())?;
        Time24::new(hour, minute)
    }
}

impl Serialize for Time24 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Time24 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A time as shown in a 12-hour picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time12 {
    /// 1 through 12.
    pub hour: u8,
    pub minute: u8,
    pub meridiem: Meridiem,
}

impl Time12 {
    pub fn to_24h(self) -> Result<Time24, TimeError> {
        if !(1..=12).contains(&self.hour) {
            return Err(TimeError::Hour12OutOfRange(self.hour));
        }
        let hour = match (self.meridiem, self.hour) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Pm, h) if h != 12 => h + 12,
            (_, h) => h,
        };
        Time24::new(hour, self.minute)
    }

    /// Moves to the next (or previous) entry of [`HOUR_STEPS`], keeping the meridiem.
    pub fn step_hour(self, forward: bool) -> Self {
        let at = HOUR_STEPS.iter().position(|&h| h == self.hour).unwrap_or(0);
        Self {
            hour: HOUR_STEPS[cycle(at, HOUR_STEPS.len(), forward)],
            ..self
        }
    }

    /// Moves to the next (or previous) entry of [`MINUTE_STEPS`].
    ///
    /// A minute between steps snaps to the neighbouring step in the chosen direction.
    pub fn step_minute(self, forward: bool) -> Self {
        let minute = match MINUTE_STEPS.iter().position(|&m| m == self.minute) {
            Some(at) => MINUTE_STEPS[cycle(at, MINUTE_STEPS.len(), forward)],
            None if forward => MINUTE_STEPS
                .iter()
                .copied()
                .find(|&m| m > self.minute)
                .unwrap_or(MINUTE_STEPS[0]),
            None => MINUTE_STEPS
                .iter()
                .copied()
                .rev()
                .find(|&m| m < self.minute)
                .unwrap_or(MINUTE_STEPS[MINUTE_STEPS.len() - 1]),
        };
        Self { minute, ..self }
    }

    pub fn toggle_meridiem(self) -> Self {
        Self {
            meridiem: self.meridiem.toggle(),
            ..self
        }
    }
}

impl FromStr for Time12 {
    type Err = TimeError;

    /// Parses the display form, `h:MM AM`. The space before the meridiem is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeError::Malformed(s.to_string());
        let text = s.trim();
        let split = text.len().checked_sub(2).ok_or_else(malformed)?;
        let (clock, meridiem) = (
            text.get(..split).ok_or_else(malformed)?,
            text.get(split..).ok_or_else(malformed)?,
        );
        let meridiem: Meridiem = meridiem.parse()?;
        let (h, m) = clock.trim_end().split_once(':').ok_or_else(malformed)?;
        let digits = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(h, 2) || !digits(m, 2) || m.len() != 2 {
            return Err(malformed());
        }
        let hour: u8 = h.parse().map_err(|_| malformed())?;
        let minute: u8 = m.parse().map_err(|_| malformed())?;
        let time = Time12 {
            hour,
            minute,
            meridiem,
        };
        time.to_24h()?;
        Ok(time)
    }
}

/// Parses a time typed by a user, either `HH:MM` or `h:MM AM|PM`.
pub fn parse_user_time(text: &str) -> Result<Time24, TimeError> {
    match text.parse::<Time24>() {
        Ok(time) => Ok(time),
        Err(err) => match text.parse::<Time12>() {
            Ok(time) => time.to_24h(),
            Err(TimeError::Malformed(_) | TimeError::Meridiem(_)) => Err(err),
            Err(other) => Err(other),
        },
    }
}

/// Index one step forward or back from `at` in a ring of `len` entries.
pub(crate) fn cycle(at: usize, len: usize, forward: bool) -> usize {
    if forward { (at + 1) % len } else { (at + len - 1) % len }
}

impl fmt::Display for Time12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02} {}", self.hour, self.minute, self.meridiem)
    }
}

/// Splits a stored `HH:MM` time into its 12-hour parts.
pub fn decode24(text: &str) -> Result<Time12, TimeError> {
    Ok(text.parse::<Time24>()?.to_12h())
}

/// Builds the stored `HH:MM` form from 12-hour parts.
pub fn encode24(hour12: u8, minute: u8, meridiem: Meridiem) -> Result<String, TimeError> {
    let time = Time12 {
        hour: hour12,
        minute,
        meridiem,
    };
    Ok(time.to_24h()?.to_string())
}

/// Renders a stored time as `h:MM AM|PM`.
pub fn display_string(text: &str) -> Result<String, TimeError> {
    Ok(decode24(text)?.to_string())
}
