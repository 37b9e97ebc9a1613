//! Display values of the countdown clocks (`MM:SS` for the game clock, `SS` for the shot clock).

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Returned when a clock value cannot be decomposed into minutes and seconds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration format: `{0}`")]
pub struct DurationFormatError(pub String);

/// Remaining time on a countdown, kept as the minutes/seconds pair that is displayed.
///
/// Seconds are not normalised: `"90"` is a seconds-only shot clock value of 90 and counts
/// down as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockValue {
    /// Whole minutes left.
    pub minutes: u32,
    /// Seconds left within the current minute.
    pub seconds: u32,
}

impl ClockValue {
    /// Whether the countdown has run out.
    pub fn is_zero(&self) -> bool {
        self.minutes == 0 && self.seconds == 0
    }

    /// Value one second later, or `None` once the countdown is exhausted.
    pub fn tick(self) -> Option<Self> {
        match (self.minutes, self.seconds) {
            (0, 0) => None,
            (minutes, 0) => Some(Self {
                minutes: minutes - 1,
                seconds: 59,
            }),
            (minutes, seconds) => Some(Self {
                minutes,
                seconds: seconds - 1,
            }),
        }
    }
}

impl FromStr for ClockValue {
    type Err = DurationFormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationFormatError(value.to_string());
        let parse_part = |part: &str| {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse::<u32>().map_err(|_| invalid())
        };

        match value.split_once(':') {
            Some((minutes, seconds)) => Ok(Self {
                minutes: parse_part(minutes)?,
                seconds: parse_part(seconds)?,
            }),
            None => Ok(Self {
                minutes: 0,
                seconds: parse_part(value)?,
            }),
        }
    }
}

impl fmt::Display for ClockValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Minutes are dropped once they reach zero so the same value serves the shot clock.
        if self.minutes > 0 {
            write!(f, "{:02}:{:02}", self.minutes, self.seconds)
        } else {
            write!(f, "{:02}", self.seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: &str) -> ClockValue {
        value.parse().unwrap()
    }

    #[test]
    fn parses_both_formats() {
        assert_eq!(
            parse("10:00"),
            ClockValue {
                minutes: 10,
                seconds: 0
            }
        );
        assert_eq!(
            parse("24"),
            ClockValue {
                minutes: 0,
                seconds: 24
            }
        );
        assert_eq!(
            parse(" 1:5 "),
            ClockValue {
                minutes: 1,
                seconds: 5
            }
        );
    }

    #[test]
    fn rejects_malformed_values() {
        for bad in ["", "abc", "10:", ":30", "1:2:3", "-5", "1.5", "10:xx"] {
            assert_eq!(
                bad.parse::<ClockValue>(),
                Err(DurationFormatError(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn tick_borrows_a_minute() {
        assert_eq!(
            parse("01:00").tick(),
            Some(ClockValue {
                minutes: 0,
                seconds: 59
            })
        );
        // minutes prefix disappears once the last minute is borrowed
        assert_eq!(parse("01:00").tick().unwrap().to_string(), "59");
        assert_eq!(parse("10:00").tick().unwrap().to_string(), "09:59");
        assert_eq!(parse("24").tick().unwrap().to_string(), "23");
        assert_eq!(parse("00:01").tick().unwrap().to_string(), "00");
        assert_eq!(parse("00:00").tick(), None);
    }

    #[test]
    fn display_pads_to_two_digits() {
        assert_eq!(
            ClockValue {
                minutes: 2,
                seconds: 3
            }
            .to_string(),
            "02:03"
        );
        assert_eq!(
            ClockValue {
                minutes: 0,
                seconds: 7
            }
            .to_string(),
            "07"
        );
    }
}
