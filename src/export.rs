use std::path::{Path, PathBuf};

use tracing::info;
use url::Url;

use crate::error::{Error, Result};
use crate::html::RawTable;
use crate::sanitize::{clean_cell, DELIMITER};
use crate::timetable::models::ScheduleSummary;

/// Query parameter of the companion app carrying the schedule
pub const DATA_PARAM: &str = "data";

fn join(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| clean_cell(c))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// Build the flat-file export of a scraped table
///
/// The header line is always written. A table whose rows all came back
/// empty is reported as having no valid data.
pub fn to_csv(table: &RawTable) -> Result<String> {
    if table.rows.is_empty() {
        return Err(Error::NoRowsFound);
    }

    let mut lines = vec![join(&table.headers)];
    lines.extend(
        table
            .rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| join(row)),
    );

    if lines.len() == 1 {
        return Err(Error::NoValidDataExtracted);
    }

    Ok(lines.join("\n"))
}

/// Write the export, creating the parent directory if needed
pub fn write_csv(path: &Path, csv: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, csv)?;
    info!(path = %path.display(), bytes = csv.len(), "CSV written");

    Ok(path.to_path_buf())
}

/// JSON form of the schedule handed to the companion app
pub fn payload_json(summary: &ScheduleSummary) -> Result<String> {
    Ok(serde_json::to_string(&summary.payload())?)
}

/// Companion app URL with the encoded schedule as query parameter
pub fn companion_url(base: &str, summary: &ScheduleSummary) -> Result<Url> {
    let json = payload_json(summary)?;
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair(DATA_PARAM, &json);

    Ok(url)
}
