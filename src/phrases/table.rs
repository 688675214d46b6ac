// Phrase Table
// Ragged, column-oriented table of classroom expressions keyed by header

use std::fmt;
use std::str::FromStr;

/// Classroom situation a phrase belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Situation {
    Opening,
    GivingFeedback,
    Closing,
}

impl Situation {
    /// All situations in menu order
    pub const ALL: [Situation; 3] = [
        Situation::Opening,
        Situation::GivingFeedback,
        Situation::Closing,
    ];

    /// Header of the CSV column holding this situation's expressions
    pub fn column_name(&self) -> &'static str {
        match self {
            Situation::Opening => "Opening",
            Situation::GivingFeedback => "Giving feedback",
            Situation::Closing => "Closing",
        }
    }

    /// Position in the situation menu, starting at 1
    pub fn menu_number(&self) -> usize {
        match self {
            Situation::Opening => 1,
            Situation::GivingFeedback => 2,
            Situation::Closing => 3,
        }
    }
}

impl fmt::Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Error returned when a situation name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid situation: {0}. Valid options: opening, giving-feedback, closing (or 1-3)")]
pub struct ParseSituationError(pub String);

impl FromStr for Situation {
    type Err = ParseSituationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();

        match normalized.as_str() {
            "1" | "opening" => Ok(Situation::Opening),
            "2" | "giving feedback" | "feedback" => Ok(Situation::GivingFeedback),
            "3" | "closing" => Ok(Situation::Closing),
            _ => Err(ParseSituationError(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    header: String,
    values: Vec<String>,
}

/// Column-oriented table of expressions
///
/// Each column keeps only its non-blank cells, in source order, so shorter
/// columns simply have fewer entries. `row_count` remembers how many data
/// records the table was built from; a table with no records is
/// structurally empty even if it has headers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhraseTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl PhraseTable {
    /// Create an empty table with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(header, values)` pairs
    ///
    /// Blank values are dropped. The row count is the length of the longest
    /// column before blanks are removed.
    pub fn from_columns<I, H, V, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (H, V)>,
        H: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row_count = 0;
        let columns = columns
            .into_iter()
            .map(|(header, values)| {
                let raw: Vec<String> = values.into_iter().map(Into::into).collect();
                row_count = row_count.max(raw.len());
                Column {
                    header: header.into(),
                    values: raw.into_iter().filter(|v| !is_blank(v)).collect(),
                }
            })
            .collect();

        Self { columns, row_count }
    }

    /// Assemble a table from already-filtered columns and a record count
    pub(crate) fn from_parts(headers: Vec<String>, values: Vec<Vec<String>>, row_count: usize) -> Self {
        let columns = headers
            .into_iter()
            .zip(values)
            .map(|(header, values)| Column { header, values })
            .collect();
        Self { columns, row_count }
    }

    /// Number of data records the table was built from
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// True when the table has no data records
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column headers in source order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    /// Look up a column by exact header name
    ///
    /// Returns `None` when no such column exists and an empty slice when the
    /// column exists but holds no values.
    pub fn column_by_name(&self, header: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|c| c.header == header)
            .map(|c| c.values.as_slice())
    }

    /// Expressions for a situation, if its column is present
    pub fn column(&self, situation: Situation) -> Option<&[String]> {
        self.column_by_name(situation.column_name())
    }

    /// Value at `row` of the column at `index`, if any
    pub(crate) fn cell(&self, index: usize, row: usize) -> Option<&str> {
        self.columns
            .get(index)
            .and_then(|c| c.values.get(row))
            .map(String::as_str)
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
