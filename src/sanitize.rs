use std::sync::LazyLock;

use regex::Regex;

/// Field delimiter of the flat-file export
pub const DELIMITER: char = ',';

/// Trim a cell and replace the delimiter so the CSV line stays well-formed
pub fn clean_cell(text: &str) -> String {
    text.trim().replace(DELIMITER, " ")
}

/// Collapse every whitespace run into a single space, then trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

static LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").unwrap());

/// Parse the numeric prefix of a cell, the way browsers read `"3 units"` as `3`
pub fn parse_leading_float(text: &str) -> Option<f64> {
    LEADING_FLOAT
        .find(text.trim())
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_cell_trims_and_drops_commas() {
        assert_eq!(clean_cell("  Calculus 1, Lecture "), "Calculus 1  Lecture");
        assert_eq!(clean_cell("a,b,c"), "a b c");
        assert_eq!(clean_cell(""), "");
    }

    #[test]
    fn collapse_whitespace_joins_text_nodes() {
        assert_eq!(collapse_whitespace("\n  TOTAL \t UNITS\n"), "TOTAL UNITS");
    }

    #[test]
    fn leading_float_variants() {
        assert_eq!(parse_leading_float("3"), Some(3.0));
        assert_eq!(parse_leading_float(" 3.5 "), Some(3.5));
        assert_eq!(parse_leading_float("3 units"), Some(3.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("-1"), Some(-1.0));
        assert_eq!(parse_leading_float("INC"), None);
        assert_eq!(parse_leading_float(""), None);
    }
}
