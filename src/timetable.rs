use std::collections::HashSet;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::html::RawTable;
use crate::sanitize::{clean_cell, parse_leading_float};
use crate::utils::{self, models::Position};

pub mod models;
pub mod time;

use models::{Day, ScheduleEntry, ScheduleSummary};
use time::{parse_time_range, Anchor};

// Column positions in a schedule row
const COURSE: usize = 0;
const TITLE: usize = 1;
const SECTION: usize = 2;
const UNITS: usize = 3;
const DAYS: usize = 4;
const TIME: usize = 5;
const ROOM: usize = 6;

/// Minimum number of cells a schedule row needs, the room being optional
pub const MIN_COLUMNS: usize = 6;
/// Room used when the row has none
pub const NO_ROOM: &str = "TBA";
/// Title prefix of the summary row the portal appends
const TOTAL_UNITS: &str = "TOTAL UNITS";

/// Entries and running bounds collected over one run
#[derive(Debug, Default)]
pub struct Accumulator {
    pub entries: Vec<ScheduleEntry>,
    days: HashSet<Day>,
    earliest: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
}

impl Accumulator {
    fn push(&mut self, entry: ScheduleEntry) {
        if self.earliest.map_or(true, |t| entry.start_time < t) {
            self.earliest = Some(entry.start_time);
        }
        if self.latest.map_or(true, |t| entry.end_time > t) {
            self.latest = Some(entry.end_time);
        }
        self.days.insert(entry.day);
        self.entries.push(entry);
    }
}

impl FromIterator<ScheduleEntry> for Accumulator {
    fn from_iter<I: IntoIterator<Item = ScheduleEntry>>(iter: I) -> Self {
        let mut acc = Self::default();
        for entry in iter {
            acc.push(entry);
        }
        acc
    }
}

/// Split a `/`-separated field, dropping empty parts
fn split_field(field: &str) -> Vec<&str> {
    field
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split one schedule row into one entry per (day, time, room)
///
/// Returns the number of entries added to `acc`. Days without their own
/// time or room reuse the first one; extra times and rooms are ignored.
pub fn decompose_row(row: &[String], anchor: &Anchor, acc: &mut Accumulator) -> usize {
    if row.len() < MIN_COLUMNS {
        debug!(cells = row.len(), "Skipping short row");
        return 0;
    }

    let cell = |i: usize| row.get(i).map_or("", |s| s.trim());
    let course_code = cell(COURSE);
    let title = clean_cell(cell(TITLE));

    if title.to_uppercase().starts_with(TOTAL_UNITS) {
        return 0;
    }

    let days = split_field(cell(DAYS));
    let times = split_field(cell(TIME));
    let room_field = row.get(ROOM).map_or(NO_ROOM, |s| s.trim());
    let rooms = split_field(room_field);

    if days.is_empty() || times.is_empty() {
        warn!(
            course = course_code,
            days = cell(DAYS),
            time = cell(TIME),
            "Skipping row with empty days or times"
        );
        return 0;
    }

    let units = parse_leading_float(cell(UNITS)).unwrap_or(0.0);

    let mut emitted = 0;
    for (i, day_token) in days.iter().enumerate() {
        let time = times.get(i).unwrap_or(&times[0]);
        let room = rooms.get(i).or_else(|| rooms.first()).unwrap_or(&NO_ROOM);

        match session(day_token, time, anchor) {
            Ok((day, range)) => {
                acc.push(ScheduleEntry {
                    course_code: course_code.to_owned(),
                    title: title.clone(),
                    section: cell(SECTION).to_owned(),
                    units,
                    day,
                    start_time: range.start,
                    end_time: range.end,
                    duration: range.duration,
                    room: (*room).to_owned(),
                });
                emitted += 1;
            }
            Err(e) => warn!(course = course_code, day = day_token, "Skipping entry: {e}"),
        }
    }

    emitted
}

/// Validate one (day, time) pair
fn session(day: &str, time: &str, anchor: &Anchor) -> Result<(Day, models::TimeRange)> {
    let day = day.parse::<Day>()?;
    let range = parse_time_range(time, anchor)?;
    if !range.is_usable() {
        return Err(Error::NonPositiveDuration {
            time: time.to_owned(),
            minutes: range.duration,
        });
    }
    Ok((day, range))
}

/// Timestamps every `step` from `start` through `end`, both included
pub fn time_slots(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Vec<DateTime<Utc>> {
    let mut slots = vec![];
    if step <= Duration::zero() {
        return slots;
    }

    let mut current = start;
    while current <= end {
        slots.push(current);
        current += step;
    }

    slots
}

/// Fold the collected entries into a summary
pub fn aggregate(acc: Accumulator, slot_minutes: i64) -> Result<ScheduleSummary> {
    if acc.entries.is_empty() {
        return Err(Error::NoValidDataExtracted);
    }

    let days = Day::ORDER
        .iter()
        .filter(|d| acc.days.contains(*d))
        .copied()
        .collect();

    let slots = match (acc.earliest, acc.latest) {
        (Some(start), Some(end)) => time_slots(start, end, Duration::minutes(slot_minutes)),
        _ => vec![],
    };

    Ok(ScheduleSummary {
        entries: acc.entries,
        days,
        start_time: acc.earliest,
        end_time: acc.latest,
        time_slots: slots,
    })
}

/// Build the schedule summary of a scraped table
pub fn extract_schedule(
    table: &RawTable,
    anchor: &Anchor,
    config: &Config,
) -> Result<ScheduleSummary> {
    if table.rows.is_empty() {
        return Err(Error::NoRowsFound);
    }

    let mut acc = Accumulator::default();
    for (i, row) in table.rows.iter().enumerate() {
        let n = decompose_row(row, anchor, &mut acc);
        debug!(row = i, entries = n, "Row decomposed");
    }

    let summary = aggregate(acc, config.slot_minutes)?;
    info!(
        entries = summary.entries.len(),
        days = summary.days.len(),
        slots = summary.time_slots.len(),
        "Schedule extracted"
    );

    Ok(summary)
}

/// Render the schedule as a slot by day grid
pub fn display(summary: &ScheduleSummary, offset: &FixedOffset, cell_length: usize) -> String {
    // Cell length for hours
    let clh = 7;

    let mut widths = vec![clh];
    widths.extend(std::iter::repeat(cell_length).take(summary.days.len()));

    let mut out = utils::line_table(&widths, &Position::Top);

    let mut header = vec![String::new()];
    header.extend(summary.days.iter().map(ToString::to_string));
    out.push_str(&utils::row_table(&header, &widths));

    for slot in &summary.time_slots {
        out.push_str(&utils::line_table(&widths, &Position::Middle));

        let mut cells = vec![slot.with_timezone(offset).format("%H:%M").to_string()];
        for day in &summary.days {
            let course = summary
                .entries
                .iter()
                .find(|e| e.day == *day && e.start_time <= *slot && *slot < e.end_time)
                .map_or(String::new(), |e| utils::etc_str(&e.course_code, cell_length));
            cells.push(course);
        }
        out.push_str(&utils::row_table(&cells, &widths));
    }

    out.push_str(&utils::line_table(&widths, &Position::Bottom));
    out
}
