use serde::Serialize;

/// Sentinel grades the portal uses for academic statuses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialCode {
    Incomplete,
    Dropped,
    Credited,
    PendingBalance,
    ExcessiveAbsences,
}

impl SpecialCode {
    /// Grade text of each status, matched exactly
    pub const TABLE: [(&'static str, SpecialCode); 5] = [
        ("9.0", SpecialCode::Incomplete),
        ("8.0", SpecialCode::Dropped),
        ("7.0", SpecialCode::Credited),
        ("6.0", SpecialCode::PendingBalance),
        ("5.0", SpecialCode::ExcessiveAbsences),
    ];

    pub fn from_text(text: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(code, _)| *code == text)
            .map(|(_, special)| *special)
    }

    pub fn code(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, special)| *special == self)
            .map_or("", |(code, _)| code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Incomplete => "Incomplete",
            Self::Dropped => "Dropped",
            Self::Credited => "Credited",
            Self::PendingBalance => "Pending Balance",
            Self::ExcessiveAbsences => "Excessive Absences",
        }
    }
}

/// Reading of one grade cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradeValue {
    /// A grade within the valid range
    Numeric(f64),
    Special(SpecialCode),
    /// Unparsable or out of range, counts for nothing
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradeColumn {
    Midterm,
    Final,
}

impl GradeColumn {
    /// Cell position in a grade row
    pub fn index(self) -> usize {
        match self {
            Self::Midterm => 4,
            Self::Final => 5,
        }
    }
}

/// A sentinel grade found in the table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub row: usize,
    pub column: GradeColumn,
    pub code: SpecialCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    Course,
    /// GWA row inserted by a previous calculation
    Summary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradeRow {
    pub cells: Vec<String>,
    pub kind: RowKind,
}

impl GradeRow {
    pub fn course<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            kind: RowKind::Course,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GradeTable {
    pub rows: Vec<GradeRow>,
}

/// Weighted averages of one calculation
///
/// A column without any counted grade has a NaN average.
#[derive(Clone, Debug, PartialEq)]
pub struct GwaResult {
    pub midterm_gwa: f64,
    pub final_gwa: f64,
    pub midterm_units: f64,
    pub final_units: f64,
    pub annotations: Vec<Annotation>,
}

/// Averages as shown to the user, two decimals
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GradeSummary {
    #[serde(rename = "midtermGWA")]
    pub midterm_gwa: String,
    #[serde(rename = "finalGWA")]
    pub final_gwa: String,
}

/// Two decimals, ties rounded away from zero (`2.125` is `"2.13"`)
fn two_decimals(value: f64) -> String {
    // `{:.2}` alone rounds an exact tie to even
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

impl From<&GwaResult> for GradeSummary {
    fn from(result: &GwaResult) -> Self {
        Self {
            midterm_gwa: two_decimals(result.midterm_gwa),
            final_gwa: two_decimals(result.final_gwa),
        }
    }
}
