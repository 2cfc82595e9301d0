use models::{Position, TabChar};

pub mod models;

/// Horizontal line of a table whose columns have the given widths
pub fn line_table(widths: &[usize], position: &Position) -> String {
    let (left, inner, right) = position.joints();
    let bar = TabChar::Bh.val().to_string();

    let columns: Vec<String> = widths.iter().map(|w| bar.repeat(*w)).collect();

    format!(
        "{}{}{}\n",
        left.val(),
        columns.join(&inner.val().to_string()),
        right.val()
    )
}

/// One line of centered cells
pub fn row_table(cells: &[String], widths: &[usize]) -> String {
    let sep = TabChar::Bv.val();

    let mut line = String::new();
    line.push(sep);
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or("", String::as_str);
        line.push_str(&format!("{cell:^width$}"));
        line.push(sep);
    }
    line.push('\n');

    line
}

/// Cut a string to fit in `width` columns, ending it with an ellipsis
pub fn etc_str(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    if width == 0 {
        return String::new();
    }

    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_match_widths() {
        assert_eq!(line_table(&[2, 3], &Position::Top), "┌──┬───┐\n");
        assert_eq!(line_table(&[1], &Position::Bottom), "└─┘\n");
    }

    #[test]
    fn rows_are_centered_and_padded() {
        let row = row_table(&["a".to_owned()], &[3, 2]);
        assert_eq!(row, "│ a │  │\n");
    }

    #[test]
    fn etc_str_cuts_long_names() {
        assert_eq!(etc_str("Calculus", 5), "Calc…");
        assert_eq!(etc_str("PE", 5), "PE");
        assert_eq!(etc_str("PE", 0), "");
    }
}
