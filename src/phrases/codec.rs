//! CSV codec for phrase tables
//!
//! Reads a header row followed by ragged records: shorter rows leave gaps
//! in the trailing columns and blank cells are skipped. Writing produces
//! minimally quoted CSV with `\n` line endings.

use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};

use super::table::{is_blank, PhraseTable};

/// UTF-8 byte-order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors produced while reading or writing phrase CSV data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("CSV data has no header row")]
    MissingHeader,

    #[error("Malformed CSV at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("Line {line} has {found} fields but the header has {expected}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Failed to write CSV: {0}")]
    Write(String),
}

impl From<csv::Error> for CodecError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CodecError::Malformed {
            line,
            message: err.to_string(),
        }
    }
}

/// Parse CSV bytes into a phrase table
///
/// A leading UTF-8 BOM is ignored and header names are trimmed. Blank lines
/// are skipped. Rows may be shorter than the header; rows that are longer
/// are rejected.
pub fn parse_table(data: &[u8]) -> Result<PhraseTable, CodecError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CodecError::MissingHeader);
    }

    let mut values: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    let mut row_count = 0;

    for record in reader.records() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(CodecError::TooManyFields {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: headers.len(),
                found: record.len(),
            });
        }

        // A line of only whitespace is a blank line, not a record
        if record.len() == 1 && is_blank(&record[0]) {
            continue;
        }

        row_count += 1;
        for (column, cell) in values.iter_mut().zip(record.iter()) {
            if !is_blank(cell) {
                column.push(cell.to_string());
            }
        }
    }

    log::debug!(
        "Parsed phrase CSV: {} columns, {} records",
        headers.len(),
        row_count
    );

    Ok(PhraseTable::from_parts(headers, values, row_count))
}

/// Encode a phrase table as CSV bytes (without a BOM)
///
/// Record `i` holds the `i`-th value of every column, or an empty field
/// where a column is shorter.
pub fn encode_table(table: &PhraseTable) -> Result<Vec<u8>, CodecError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.headers())?;

    let column_count = table.column_count();
    for row in 0..table.row_count() {
        let record: Vec<&str> = (0..column_count)
            .map(|index| table.cell(index, row).unwrap_or(""))
            .collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|err| CodecError::Write(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phrases::Situation;

    #[test]
    fn test_parse_basic() {
        let csv = "Opening,Giving feedback,Closing\nHello,Nice,Bye\nWelcome,Great,See you\n";
        let table = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column(Situation::Opening).unwrap(),
            &["Hello".to_string(), "Welcome".to_string()]
        );
        assert_eq!(
            table.column(Situation::Closing).unwrap(),
            &["Bye".to_string(), "See you".to_string()]
        );
    }

    #[test]
    fn test_parse_ragged_rows() {
        let csv = "Opening,Giving feedback,Closing\nA,B,C\nD,E\nF\n";
        let table = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column(Situation::Opening).unwrap().len(), 3);
        assert_eq!(table.column(Situation::GivingFeedback).unwrap().len(), 2);
        assert_eq!(table.column(Situation::Closing).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_column_order_insensitive() {
        let csv = "Closing,Opening\nBye,Hi\n";
        let table = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(table.column(Situation::Opening).unwrap(), &["Hi".to_string()]);
        assert_eq!(table.column(Situation::Closing).unwrap(), &["Bye".to_string()]);
        assert!(table.column(Situation::GivingFeedback).is_none());
    }

    #[test]
    fn test_parse_strips_bom_and_trims_headers() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(b"Opening, Giving feedback, Closing\nA,B,C\n");
        let table = parse_table(&data).unwrap();

        assert_eq!(
            table.headers().collect::<Vec<_>>(),
            vec!["Opening", "Giving feedback", "Closing"]
        );
        assert_eq!(table.column(Situation::GivingFeedback).unwrap(), &["B".to_string()]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let csv = "Opening\n\"Good morning, everyone.\"\n\"She said \"\"hi\"\"\"\n";
        let table = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(
            table.column(Situation::Opening).unwrap(),
            &[
                "Good morning, everyone.".to_string(),
                "She said \"hi\"".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_headers_only_is_empty() {
        let table = parse_table(b"Opening,Giving feedback,Closing\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_parse_whitespace_lines_are_skipped() {
        let table = parse_table(b"Opening,Giving feedback,Closing\n   \n\t\n").unwrap();
        assert!(table.is_empty());

        let table = parse_table(b"Opening,Closing\nHi,Bye\n  \nHello,\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column(Situation::Opening).unwrap(),
            &["Hi".to_string(), "Hello".to_string()]
        );
    }

    #[test]
    fn test_parse_separator_only_row_counts() {
        let table = parse_table(b"Opening,Giving feedback,Closing\n,,\n").unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.column(Situation::Opening).unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_table(b"").unwrap_err(), CodecError::MissingHeader);
        assert_eq!(parse_table(UTF8_BOM).unwrap_err(), CodecError::MissingHeader);
    }

    #[test]
    fn test_parse_too_many_fields() {
        let csv = "Opening,Closing\nA,B\nC,D,E\n";
        let err = parse_table(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::TooManyFields {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let data = b"Opening\n\xFF\xFE\n";
        assert!(matches!(
            parse_table(data).unwrap_err(),
            CodecError::Malformed { .. }
        ));
    }

    #[test]
    fn test_encode_quotes_only_when_needed() {
        let table = PhraseTable::from_columns([
            ("Opening", vec!["Good morning, everyone.", "Hi"]),
            ("Closing", vec!["Bye"]),
        ]);
        let bytes = encode_table(&table).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Opening,Closing\n\"Good morning, everyone.\",Bye\nHi,\n"
        );
    }

    #[test]
    fn test_encode_then_parse_keeps_gaps() {
        let table = PhraseTable::from_columns([
            ("Opening", vec!["A", "B", "C"]),
            ("Giving feedback", vec!["D"]),
            ("Closing", vec!["E", "F"]),
        ]);
        let bytes = encode_table(&table).unwrap();
        assert_eq!(parse_table(&bytes).unwrap(), table);
    }
}
