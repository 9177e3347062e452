//! Trading session classification of an entry time.
//!
//! Session windows are half-open `[start, end)` minute-of-day ranges on the
//! UTC clock. A window whose start lies after its end wraps past midnight.
//! The London/New York overlap is not configured separately: it is the
//! intersection of the two windows and is carved out of both. Minutes not
//! claimed by any window are `OffHours`, so every minute of the day maps to
//! exactly one session.

use crate::domain::error::JournalError;
use chrono::{FixedOffset, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    Asian,
    London,
    NewYork,
    LondonNewYorkOverlap,
    OffHours,
}

impl Session {
    pub const ALL: [Session; 5] = [
        Session::Asian,
        Session::London,
        Session::NewYork,
        Session::LondonNewYorkOverlap,
        Session::OffHours,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Session::Asian => "Asian",
            Session::London => "London",
            Session::NewYork => "NewYork",
            Session::LondonNewYorkOverlap => "LondonNewYorkOverlap",
            Session::OffHours => "OffHours",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    start: u16,
    end: u16,
}

impl SessionWindow {
    /// Both bounds are minutes past midnight; `end` may be 1440 for
    /// "until midnight".
    pub fn new(start: u16, end: u16) -> Result<Self, String> {
        if start >= MINUTES_PER_DAY {
            return Err(format!("start minute {start} is outside the day"));
        }
        if end > MINUTES_PER_DAY {
            return Err(format!("end minute {end} is outside the day"));
        }
        if start == end {
            return Err("window is empty".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn contains(&self, minute: u16) -> bool {
        if self.start < self.end {
            minute >= self.start && minute < self.end
        } else {
            minute >= self.start || minute < self.end
        }
    }

    pub fn intersects(&self, other: &SessionWindow) -> bool {
        (0..MINUTES_PER_DAY).any(|m| self.contains(m) && other.contains(m))
    }
}

impl FromStr for SessionWindow {
    type Err = String;

    /// Parses `HH:MM-HH:MM`; `24:00` is accepted as an end bound.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("expected HH:MM-HH:MM, got '{s}'"))?;
        SessionWindow::new(parse_clock(start)?, parse_clock(end)?)
    }
}

impl fmt::Display for SessionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}

fn parse_clock(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let (h, m) = s
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{s}'"))?;
    let hours: u16 = h.parse().map_err(|_| format!("invalid hour in '{s}'"))?;
    let minutes: u16 = m.parse().map_err(|_| format!("invalid minute in '{s}'"))?;
    if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(format!("'{s}' is not a clock time"));
    }
    Ok(hours * 60 + minutes)
}

/// Classifies entry times against a fixed window table.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDetector {
    asian: SessionWindow,
    london: SessionWindow,
    new_york: SessionWindow,
}

impl SessionDetector {
    /// Errors when the Asian window touches London or New York; only the
    /// London/New York pair may intersect.
    pub fn new(
        asian: SessionWindow,
        london: SessionWindow,
        new_york: SessionWindow,
    ) -> Result<Self, JournalError> {
        if asian.intersects(&london) {
            return Err(JournalError::config_invalid(
                "sessions",
                "asian",
                format!("window {asian} overlaps london {london}"),
            ));
        }
        if asian.intersects(&new_york) {
            return Err(JournalError::config_invalid(
                "sessions",
                "asian",
                format!("window {asian} overlaps new_york {new_york}"),
            ));
        }
        Ok(Self {
            asian,
            london,
            new_york,
        })
    }

    pub fn asian(&self) -> SessionWindow {
        self.asian
    }

    pub fn london(&self) -> SessionWindow {
        self.london
    }

    pub fn new_york(&self) -> SessionWindow {
        self.new_york
    }

    /// `entry_time` is wall-clock time in a zone `reference_utc_offset` away
    /// from UTC.
    pub fn detect(&self, entry_time: NaiveTime, reference_utc_offset: FixedOffset) -> Session {
        let local = (entry_time.hour() * 60 + entry_time.minute()) as i32;
        let offset = reference_utc_offset.local_minus_utc() / 60;
        let minute = (local - offset).rem_euclid(MINUTES_PER_DAY as i32) as u16;
        self.classify_minute(minute)
    }

    /// Session for a minute of the UTC day (0..1440).
    pub fn classify_minute(&self, minute: u16) -> Session {
        let in_london = self.london.contains(minute);
        let in_new_york = self.new_york.contains(minute);
        match (in_london, in_new_york) {
            (true, true) => Session::LondonNewYorkOverlap,
            (true, false) => Session::London,
            (false, true) => Session::NewYork,
            (false, false) if self.asian.contains(minute) => Session::Asian,
            (false, false) => Session::OffHours,
        }
    }
}

impl Default for SessionDetector {
    /// Asian 00:00-07:00, London 07:00-16:00, New York 12:00-21:00 (UTC).
    fn default() -> Self {
        Self {
            asian: SessionWindow { start: 0, end: 7 * 60 },
            london: SessionWindow {
                start: 7 * 60,
                end: 16 * 60,
            },
            new_york: SessionWindow {
                start: 12 * 60,
                end: 21 * 60,
            },
        }
    }
}
