use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::grades::models::{Annotation, GradeRow, GradeTable, RowKind};
use crate::sanitize::collapse_whitespace;

/// Header and row texts of a scraped table
///
/// `rows` holds one entry per matched row element, even when the row has
/// no cells, so an empty body can be told apart from a body of empty rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector {
        selector: css.to_owned(),
        reason: format!("{e:?}"),
    })
}

/// Visible text of an element, whitespace collapsed
fn cell_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn cells(row: ElementRef, sel: &Selector) -> Vec<String> {
    row.select(sel).map(cell_text).collect()
}

/// Read the schedule table of a portal page
pub fn schedule_table(document: &Html, config: &Config) -> Result<RawTable> {
    let sel_rows = selector(&config.schedule_rows)?;
    let sel_headers = selector(&config.schedule_headers)?;
    let sel_td = selector("td")?;

    let headers = document.select(&sel_headers).map(cell_text).collect();
    let rows: Vec<Vec<String>> = document
        .select(&sel_rows)
        .map(|row| cells(row, &sel_td))
        .collect();

    debug!(rows = rows.len(), "Schedule table scraped");
    Ok(RawTable { headers, rows })
}

/// Read the grade table of a portal page, recognizing a previous GWA row
pub fn grade_table(document: &Html, config: &Config) -> Result<GradeTable> {
    let sel_rows = selector(&config.grade_rows)?;
    let sel_cells = selector("td, th")?;

    let rows: Vec<GradeRow> = document
        .select(&sel_rows)
        .map(|row| {
            let kind = if row.value().classes().any(|c| c == config.summary_class) {
                RowKind::Summary
            } else {
                RowKind::Course
            };
            GradeRow {
                cells: cells(row, &sel_cells),
                kind,
            }
        })
        .collect();

    debug!(rows = rows.len(), "Grade table scraped");
    Ok(GradeTable { rows })
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Markup of the grade table body, with the GWA row and status labels
pub fn render_grade_rows(table: &GradeTable, annotations: &[Annotation], config: &Config) -> String {
    let mut out = String::new();

    for (i, row) in table.rows.iter().enumerate() {
        match row.kind {
            RowKind::Summary => {
                out.push_str(&format!("<tr class=\"{}\">", escape(&config.summary_class)));
                let mut cells = row.cells.iter();
                if let Some(label) = cells.next() {
                    out.push_str(&format!("<td colspan=\"3\">{}</td>", escape(label)));
                }
                for cell in cells {
                    out.push_str(&format!("<td>{}</td>", escape(cell)));
                }
            }
            RowKind::Course => {
                out.push_str("<tr>");
                for (j, cell) in row.cells.iter().enumerate() {
                    match annotations.iter().find(|a| a.row == i && a.column.index() == j) {
                        Some(a) => out.push_str(&format!(
                            "<td data-status=\"{label}\" title=\"{label}\">{}</td>",
                            escape(cell),
                            label = a.code.label()
                        )),
                        None => out.push_str(&format!("<td>{}</td>", escape(cell))),
                    }
                }
            }
        }
        out.push_str("</tr>\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <table class="assessment_schedule">
          <thead><tr><th>Course</th><th>Title</th><th>Section</th><th>Units</th><th>Days</th><th>Time</th><th>Room</th></tr></thead>
          <tbody>
            <tr><td>CS101</td><td> Intro,  <b>Programming</b> </td><td>A1</td><td>3</td><td>M/W</td><td>9:00-10:00</td><td>301</td></tr>
            <tr></tr>
          </tbody>
        </table>
        <table class="table">
          <tbody>
            <tr><td>CS101</td><td>Intro</td><td>A1</td><td>3</td><td>3.5</td><td>4.0</td></tr>
            <tr class="gwa-row"><td colspan="3">General Weighted Average (GWA):</td><td>3</td><td>3.50</td><td>4.00</td></tr>
          </tbody>
        </table>
    "#;

    #[test]
    fn scrapes_schedule_headers_and_rows() {
        let document = Html::parse_document(PAGE);
        let table = schedule_table(&document, &Config::default()).unwrap();

        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.headers[6], "Room");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], "Intro, Programming");
        assert!(table.rows[1].is_empty());
    }

    #[test]
    fn scrapes_grade_rows_and_summary() {
        let document = Html::parse_document(PAGE);
        let table = grade_table(&document, &Config::default()).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].kind, RowKind::Course);
        assert_eq!(table.rows[0].cells[4], "3.5");
        assert_eq!(table.rows[1].kind, RowKind::Summary);
    }

    #[test]
    fn missing_table_gives_no_rows() {
        let document = Html::parse_document("<p>Please log in</p>");
        let table = schedule_table(&document, &Config::default()).unwrap();
        assert!(table.rows.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn bad_selector_is_reported() {
        let config = Config {
            schedule_rows: "tr[".to_owned(),
            ..Config::default()
        };
        let document = Html::parse_document(PAGE);
        assert!(matches!(
            schedule_table(&document, &config),
            Err(Error::Selector { .. })
        ));
    }

    #[test]
    fn escapes_rendered_cells() {
        let table = GradeTable {
            rows: vec![GradeRow {
                cells: vec!["<b>".to_owned()],
                kind: RowKind::Course,
            }],
        };
        let html = render_grade_rows(&table, &[], &Config::default());
        assert_eq!(html, "<tr><td>&lt;b&gt;</td></tr>\n");
    }
}
