use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const SCHEDULE_ROWS: &str = ".assessment_schedule tbody tr";
pub const SCHEDULE_HEADERS: &str = ".assessment_schedule thead th";
pub const GRADE_ROWS: &str = ".table tbody tr";
pub const SUMMARY_CLASS: &str = "gwa-row";
pub const COMPANION_URL: &str = "https://sched.chikiran.com/schedule";
pub const CSV_FILENAME: &str = "schedule.csv";
pub const SLOT_MINUTES: i64 = 30;

/// Selectors and output settings, all defaulting to the portal's layout
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rows of the schedule table
    pub schedule_rows: String,
    /// Header cells of the schedule table
    pub schedule_headers: String,
    /// Rows of the grade table
    pub grade_rows: String,
    /// Class name marking the GWA summary row
    pub summary_class: String,
    /// Page of the companion web app receiving the schedule
    pub companion_url: String,
    /// File name of the CSV export
    pub csv_filename: String,
    /// Spacing of the time slot grid, in minutes
    pub slot_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule_rows: SCHEDULE_ROWS.to_owned(),
            schedule_headers: SCHEDULE_HEADERS.to_owned(),
            grade_rows: GRADE_ROWS.to_owned(),
            summary_class: SUMMARY_CLASS.to_owned(),
            companion_url: COMPANION_URL.to_owned(),
            csv_filename: CSV_FILENAME.to_owned(),
            slot_minutes: SLOT_MINUTES,
        }
    }
}

impl Config {
    /// Parse a TOML document, missing keys keep their default
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.slot_minutes <= 0 {
            return Err(Error::Config(format!(
                "slot_minutes must be positive, got {}",
                self.slot_minutes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_override() {
        let config = Config::from_toml("slot_minutes = 15\ncsv_filename = \"out.csv\"").unwrap();
        assert_eq!(config.slot_minutes, 15);
        assert_eq!(config.csv_filename, "out.csv");
        assert_eq!(config.schedule_rows, SCHEDULE_ROWS);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_toml("slot_minutes = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml("unknown = 1"),
            Err(Error::Config(_))
        ));
    }
}
