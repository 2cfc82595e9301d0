use dialoguer::MultiSelect;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::timetable::{aggregate, models::ScheduleSummary, Accumulator};

const DISCLAIMER: &str = "(select with SPACE, ENTER to confirm)";

/// Course codes of the schedule, in order of first appearance
pub fn course_codes(summary: &ScheduleSummary) -> Vec<String> {
    let mut codes: Vec<String> = vec![];
    for entry in &summary.entries {
        if !codes.contains(&entry.course_code) {
            codes.push(entry.course_code.clone());
        }
    }
    codes
}

/// Keep only the given courses, recomputing days and time bounds
pub fn retain_courses(
    summary: ScheduleSummary,
    keep: &[String],
    config: &Config,
) -> Result<ScheduleSummary> {
    let acc: Accumulator = summary
        .entries
        .into_iter()
        .filter(|e| keep.contains(&e.course_code))
        .collect();

    aggregate(acc, config.slot_minutes)
}

/// Ask which courses to keep
pub fn courses(summary: ScheduleSummary, config: &Config) -> Result<ScheduleSummary> {
    let multiselected = course_codes(&summary);

    let defaults = vec![true; multiselected.len()];
    let selections = MultiSelect::new()
        .with_prompt(format!("Choose your courses {DISCLAIMER}"))
        .items(&multiselected[..])
        .defaults(&defaults[..])
        .interact()
        .map_err(|e| Error::Unexpected(e.to_string()))?;

    let keep: Vec<String> = selections
        .into_iter()
        .map(|i| multiselected[i].clone())
        .collect();
    info!(kept = keep.len(), of = multiselected.len(), "Courses selected");

    retain_courses(summary, &keep, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{decompose_row, models::Day, time::Anchor};
    use chrono::NaiveDate;

    fn summary() -> ScheduleSummary {
        let anchor = Anchor::utc(NaiveDate::from_ymd_opt(2024, 8, 12).unwrap());
        let mut acc = Accumulator::default();
        for row in [
            ["CS101", "Intro", "A1", "3", "M/W", "9:00-10:30", "301"],
            ["MA102", "Calc", "B2", "3", "F", "7:00-8:00", "302"],
            ["CS101", "Intro Lab", "A1", "1", "S", "13:00-16:00", "LAB"],
        ] {
            let row: Vec<String> = row.iter().map(|c| (*c).to_owned()).collect();
            decompose_row(&row, &anchor, &mut acc);
        }
        aggregate(acc, 30).unwrap()
    }

    #[test]
    fn codes_are_unique_and_ordered() {
        assert_eq!(course_codes(&summary()), vec!["CS101", "MA102"]);
    }

    #[test]
    fn retain_recomputes_metadata() {
        let kept = retain_courses(summary(), &["MA102".to_owned()], &Config::default()).unwrap();

        assert_eq!(kept.entries.len(), 1);
        assert_eq!(kept.days, vec![Day::F]);
        assert_eq!(kept.start_time.unwrap().format("%H:%M").to_string(), "07:00");
        assert_eq!(kept.time_slots.len(), 3);
    }

    #[test]
    fn retaining_nothing_is_no_data() {
        assert!(matches!(
            retain_courses(summary(), &[], &Config::default()),
            Err(Error::NoValidDataExtracted)
        ));
    }
}
