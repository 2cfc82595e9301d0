use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::Error;

/// Day of the week, as written by the portal
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    M,
    T,
    W,
    TH,
    F,
    S,
    U,
}

impl Day {
    /// Canonical week order
    pub const ORDER: [Day; 7] = [Day::M, Day::T, Day::W, Day::TH, Day::F, Day::S, Day::U];

    pub fn code(self) -> &'static str {
        match self {
            Self::M => "M",
            Self::T => "T",
            Self::W => "W",
            Self::TH => "TH",
            Self::F => "F",
            Self::S => "S",
            Self::U => "U",
        }
    }
}

impl FromStr for Day {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ORDER
            .iter()
            .find(|d| d.code() == upper)
            .copied()
            .ok_or_else(|| Error::UnknownDay(s.to_owned()))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A parsed `H:MM-H:MM` range anchored on a calendar date
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Minutes between start and end, may be zero or negative
    pub duration: f64,
}

impl TimeRange {
    /// Only ranges with a positive duration can become entries
    pub fn is_usable(&self) -> bool {
        self.duration > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub course_code: String,
    pub title: String,
    pub section: String,
    pub units: f64,
    pub day: Day,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Length of the session in minutes, always positive
    pub duration: f64,
    pub room: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleSummary {
    pub entries: Vec<ScheduleEntry>,
    /// Days present in `entries`, in week order
    pub days: Vec<Day>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Grid of slots from `start_time` through `end_time`
    pub time_slots: Vec<DateTime<Utc>>,
}

/// JSON body handed to the companion web app
#[derive(Debug, Serialize)]
pub struct SchedulePayload<'a> {
    pub entries: &'a [ScheduleEntry],
    pub metadata: Metadata<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata<'a> {
    pub days: &'a [Day],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub time_slots: &'a [DateTime<Utc>],
}

impl ScheduleSummary {
    pub fn payload(&self) -> SchedulePayload<'_> {
        SchedulePayload {
            entries: &self.entries,
            metadata: Metadata {
                days: &self.days,
                start_time: self.start_time,
                end_time: self.end_time,
                time_slots: &self.time_slots,
            },
        }
    }
}
