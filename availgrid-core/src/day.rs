use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DayError;
use crate::time::cycle;

/// One of the seven canonical weekday labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }

    /// The next (or previous) day, wrapping around the week.
    pub fn step(self, forward: bool) -> Self {
        let at = Self::ALL.iter().position(|&d| d == self).unwrap_or(0);
        Self::ALL[cycle(at, Self::ALL.len(), forward)]
    }

    /// Monday through Friday.
    pub fn workweek() -> Vec<Weekday> {
        Self::ALL[..5].to_vec()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Weekday {
    type Err = DayError;

    /// Accepts any casing of a label, or a longer name starting with one
    /// (`tues`, `Thursday`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let prefix = lower.get(..3).ok_or_else(|| DayError(s.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(prefix))
            .ok_or_else(|| DayError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_long_names() {
        assert_eq!("Mon".parse::<Weekday>().unwrap(), Weekday::Mon);
        assert_eq!("tue".parse::<Weekday>().unwrap(), Weekday::Tue);
        assert_eq!("Tues".parse::<Weekday>().unwrap(), Weekday::Tue);
        assert_eq!(" THURSDAY ".parse::<Weekday>().unwrap(), Weekday::Thu);
        assert_eq!("sunday".parse::<Weekday>().unwrap(), Weekday::Sun);
    }

    #[test]
    fn rejects_unknown_days() {
        assert!("Mo".parse::<Weekday>().is_err());
        assert!("Xyz".parse::<Weekday>().is_err());
        assert!("".parse::<Weekday>().is_err());
    }

    #[test]
    fn display_matches_label() {
        let labels: Vec<String> = Weekday::ALL.iter().map(|d| d.to_string()).collect();
        assert_eq!(labels, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert_eq!(Weekday::workweek().last(), Some(&Weekday::Fri));
    }

    #[test]
    fn step_wraps_around_the_week() {
        assert_eq!(Weekday::Sun.step(true), Weekday::Mon);
        assert_eq!(Weekday::Mon.step(false), Weekday::Sun);
        assert_eq!(Weekday::Wed.step(true), Weekday::Thu);
    }
}
