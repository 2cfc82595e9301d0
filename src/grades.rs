use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::sanitize::parse_leading_float;
use crate::utils::{self, models::Position};

pub mod models;

use models::{
    Annotation, GradeColumn, GradeRow, GradeSummary, GradeTable, GradeValue, GwaResult, RowKind,
    SpecialCode,
};

const UNITS: usize = 3;
/// Minimum number of cells of a grade row
pub const MIN_COLUMNS: usize = 6;
/// Valid grades, inclusive
pub const GRADE_RANGE: (f64, f64) = (0.0, 4.0);
pub const SUMMARY_LABEL: &str = "General Weighted Average (GWA):";

/// Read a grade cell
pub fn classify(text: &str) -> GradeValue {
    let text = text.trim();
    if let Some(code) = SpecialCode::from_text(text) {
        return GradeValue::Special(code);
    }

    match parse_leading_float(text) {
        Some(grade) if (GRADE_RANGE.0..=GRADE_RANGE.1).contains(&grade) => {
            GradeValue::Numeric(grade)
        }
        _ => GradeValue::Ignored,
    }
}

/// Running weighted sum of one column
#[derive(Default)]
struct Total {
    weighted: f64,
    units: f64,
}

impl Total {
    fn gwa(&self) -> f64 {
        self.weighted / self.units
    }
}

/// Compute the midterm and final GWA, then put a fresh summary row in the table
///
/// Summary rows left by a previous call are dropped before counting, so
/// calling this twice gives the same numbers. Annotation rows index the
/// table as it is after the call.
pub fn calculate_gwa(table: &mut GradeTable) -> Result<GwaResult> {
    if table.rows.is_empty() {
        return Err(Error::NoRowsFound);
    }
    table.rows.retain(|row| row.kind != RowKind::Summary);

    let mut midterm = Total::default();
    let mut final_ = Total::default();
    let mut annotations = vec![];

    let mut columns = [
        (GradeColumn::Midterm, &mut midterm),
        (GradeColumn::Final, &mut final_),
    ];

    for (i, row) in table.rows.iter().enumerate() {
        if row.cells.len() < MIN_COLUMNS {
            continue;
        }

        let units = parse_leading_float(&row.cells[UNITS]);

        for (column, total) in &mut columns {
            match classify(&row.cells[column.index()]) {
                GradeValue::Special(code) => {
                    debug!(row = i, code = code.code(), "Special grade");
                    annotations.push(Annotation {
                        row: i,
                        column: *column,
                        code,
                    });
                }
                GradeValue::Numeric(grade) => {
                    if let Some(units) = units {
                        total.units += units;
                        total.weighted += units * grade;
                    }
                }
                GradeValue::Ignored => (),
            }
        }
    }

    let mut result = GwaResult {
        midterm_gwa: midterm.gwa(),
        final_gwa: final_.gwa(),
        midterm_units: midterm.units,
        final_units: final_.units,
        annotations,
    };

    insert_summary(table, &mut result);
    info!(
        midterm = result.midterm_gwa,
        final_ = result.final_gwa,
        "GWA calculated"
    );

    Ok(result)
}

/// Put the summary row before the last row, keeping annotations on their cells
fn insert_summary(table: &mut GradeTable, result: &mut GwaResult) {
    let summary = GradeSummary::from(&*result);
    let row = GradeRow {
        cells: vec![
            SUMMARY_LABEL.to_owned(),
            result.midterm_units.to_string(),
            summary.midterm_gwa,
            summary.final_gwa,
        ],
        kind: RowKind::Summary,
    };

    let at = table.rows.len().saturating_sub(1);
    table.rows.insert(at, row);

    for annotation in &mut result.annotations {
        if annotation.row >= at {
            annotation.row += 1;
        }
    }
}

/// Render the grade table with the status of sentinel grades
pub fn display(table: &GradeTable, annotations: &[Annotation], cell_length: usize) -> String {
    let columns = table.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let widths = vec![cell_length; columns];

    let mut out = utils::line_table(&widths, &Position::Top);
    for (i, row) in table.rows.iter().enumerate() {
        if i > 0 {
            out.push_str(&utils::line_table(&widths, &Position::Middle));
        }

        let cells: Vec<String> = match row.kind {
            // Label spans the first three columns
            RowKind::Summary => {
                let mut cells = vec![String::new(); 2];
                cells.push(utils::etc_str("GWA", cell_length));
                cells.extend(row.cells.iter().skip(1).cloned());
                cells
            }
            RowKind::Course => row
                .cells
                .iter()
                .enumerate()
                .map(|(j, cell)| {
                    match annotations.iter().find(|a| a.row == i && a.column.index() == j) {
                        Some(a) => utils::etc_str(a.code.label(), cell_length),
                        None => utils::etc_str(cell, cell_length),
                    }
                })
                .collect(),
        };
        out.push_str(&utils::row_table(&cells, &widths));
    }
    out.push_str(&utils::line_table(&widths, &Position::Bottom));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[[&str; 6]]) -> GradeTable {
        GradeTable {
            rows: rows.iter().map(|r| GradeRow::course(*r)).collect(),
        }
    }

    #[test]
    fn classify_cells() {
        assert_eq!(classify("3.5"), GradeValue::Numeric(3.5));
        assert_eq!(classify(" 0.0 "), GradeValue::Numeric(0.0));
        assert_eq!(classify("4"), GradeValue::Numeric(4.0));
        assert_eq!(classify("9.0"), GradeValue::Special(SpecialCode::Incomplete));
        assert_eq!(classify("5.0"), GradeValue::Special(SpecialCode::ExcessiveAbsences));
        assert_eq!(classify("4.5"), GradeValue::Ignored);
        assert_eq!(classify("-1"), GradeValue::Ignored);
        assert_eq!(classify(""), GradeValue::Ignored);
        assert_eq!(classify("P"), GradeValue::Ignored);
        // Sentinels match exactly
        assert_eq!(classify("9.00"), GradeValue::Ignored);
    }

    #[test]
    fn weighted_averages() {
        let mut t = table(&[
            ["CS1", "A", "1", "3", "4.0", "3.0"],
            ["MA1", "B", "1", "2", "2.5", "3.5"],
            ["", "", "", "", "", ""],
        ]);
        let result = calculate_gwa(&mut t).unwrap();

        assert!((result.midterm_units - 5.0).abs() < f64::EPSILON);
        assert!((result.midterm_gwa - 3.4).abs() < 1e-9);
        let summary = GradeSummary::from(&result);
        assert_eq!(summary.midterm_gwa, "3.40");
        assert_eq!(summary.final_gwa, "3.20");
    }

    #[test]
    fn half_hundredths_round_up() {
        // (3 * 2.0 + 1 * 2.5) / 4 is exactly 2.125
        let mut t = table(&[
            ["CS1", "LEC", "1", "3", "2.0", "2.0"],
            ["CS1L", "LAB", "1", "1", "2.5", "2.5"],
        ]);
        let result = calculate_gwa(&mut t).unwrap();

        assert!((result.midterm_gwa - 2.125).abs() < f64::EPSILON);
        let summary = GradeSummary::from(&result);
        assert_eq!(summary.midterm_gwa, "2.13");
        assert_eq!(summary.final_gwa, "2.13");
    }

    #[test]
    fn incomplete_midterm_is_annotated_not_counted() {
        let mut t = table(&[
            ["CS1", "A", "1", "3", "9.0", "3.0"],
            ["MA1", "B", "1", "2", "3.0", "3.0"],
        ]);
        let result = calculate_gwa(&mut t).unwrap();

        assert!((result.midterm_units - 2.0).abs() < f64::EPSILON);
        assert!((result.final_units - 5.0).abs() < f64::EPSILON);
        assert_eq!(
            result.annotations,
            vec![Annotation {
                row: 0,
                column: GradeColumn::Midterm,
                code: SpecialCode::Incomplete
            }]
        );
        assert_eq!(result.annotations[0].code.label(), "Incomplete");
    }

    #[test]
    fn no_midterm_grades_is_nan() {
        let mut t = table(&[["CS1", "A", "1", "3", "", "3.0"]]);
        let result = calculate_gwa(&mut t).unwrap();

        assert!(result.midterm_gwa.is_nan());
        let summary = GradeSummary::from(&result);
        assert_eq!(summary.midterm_gwa, "NaN");
        assert_eq!(summary.final_gwa, "3.00");
    }

    #[test]
    fn unparsable_units_count_nothing() {
        let mut t = table(&[
            ["CS1", "A", "1", "n/a", "4.0", "4.0"],
            ["MA1", "B", "1", "3", "2.0", "2.0"],
        ]);
        let result = calculate_gwa(&mut t).unwrap();
        assert!((result.midterm_gwa - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn second_run_ignores_previous_summary() {
        let mut t = table(&[
            ["CS1", "A", "1", "3", "3.0", "2.0"],
            ["MA1", "B", "1", "3", "4.0", "4.0"],
            ["", "TOTAL", "", "6", "", ""],
        ]);
        let first = calculate_gwa(&mut t).unwrap();
        let rows_after_first = t.rows.len();
        let second = calculate_gwa(&mut t).unwrap();

        assert_eq!(first, second);
        assert_eq!(t.rows.len(), rows_after_first);
        assert_eq!(t.rows.iter().filter(|r| r.kind == RowKind::Summary).count(), 1);
        // Inserted before the last row
        assert_eq!(t.rows[2].kind, RowKind::Summary);
        assert_eq!(t.rows[2].cells[0], SUMMARY_LABEL);
    }

    #[test]
    fn summary_row_with_six_cells_is_still_skipped() {
        let mut t = table(&[["CS1", "A", "1", "3", "3.0", "3.0"]]);
        t.rows.push(GradeRow {
            cells: ["", "", "", "99", "1.0", "1.0"].map(String::from).to_vec(),
            kind: RowKind::Summary,
        });
        let result = calculate_gwa(&mut t).unwrap();
        assert!((result.midterm_gwa - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_table() {
        assert!(matches!(
            calculate_gwa(&mut GradeTable::default()),
            Err(Error::NoRowsFound)
        ));
    }

    #[test]
    fn display_shows_labels() {
        let mut t = table(&[["CS1", "A", "1", "3", "9.0", "3.0"]]);
        let result = calculate_gwa(&mut t).unwrap();
        let out = display(&t, &result.annotations, 12);
        assert!(out.contains("Incomplete"));
        assert!(out.contains("GWA"));
    }
}
