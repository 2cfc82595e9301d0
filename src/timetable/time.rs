use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use regex::Regex;

use super::models::TimeRange;
use crate::error::{Error, Result};

// h => hour, m => minute, seconds are ignored
static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<h>\d{1,2})(:(?P<m>\d{1,2})?)?(:\d{1,2})?$").unwrap()
});

/// Calendar date and UTC offset the clock times of a run are attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub date: NaiveDate,
    pub offset: FixedOffset,
}

impl Anchor {
    /// Today, in the local time zone
    pub fn today() -> Self {
        let now = Local::now();
        Self {
            date: now.date_naive(),
            offset: now.offset().fix(),
        }
    }

    /// A given date, in the local time zone
    pub fn on(date: NaiveDate) -> Self {
        let offset = date
            .and_hms_opt(12, 0, 0)
            .and_then(|noon| Local.from_local_datetime(&noon).earliest())
            .map_or_else(|| Anchor::today().offset, |dt| dt.offset().fix());

        Self { date, offset }
    }

    /// A given date with times read as UTC
    pub fn utc(date: NaiveDate) -> Self {
        Self {
            date,
            offset: Utc.fix(),
        }
    }

    fn at(&self, time: NaiveTime) -> DateTime<Utc> {
        let local = self.date.and_time(time);
        // A fixed offset never has gaps or folds
        self.offset
            .from_local_datetime(&local)
            .single()
            .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc))
    }
}

/// Read one `H[:M]` clock token
fn parse_clock(token: &str) -> Option<NaiveTime> {
    let captures = CLOCK.captures(token.trim())?;

    let hour = captures.name("h")?.as_str().parse().ok()?;
    let minute = match captures.name("m") {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse a `H:MM-H:MM` range
///
/// Reversed or empty ranges are not an error: they come back with a
/// non-positive duration and the caller decides to drop them.
pub fn parse_time_range(token: &str, anchor: &Anchor) -> Result<TimeRange> {
    let malformed = || Error::MalformedTime(token.to_owned());

    let mut parts = token.trim().split('-');
    let start = parts.next().and_then(parse_clock).ok_or_else(malformed)?;
    let end = parts.next().and_then(parse_clock).ok_or_else(malformed)?;

    let start = anchor.at(start);
    let end = anchor.at(end);
    #[allow(clippy::cast_precision_loss)]
    let duration = (end - start).num_seconds() as f64 / 60.0;

    Ok(TimeRange {
        start,
        end,
        duration,
    })
}
