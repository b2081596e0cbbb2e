//! Minimal RFC 4180 reader and writer
//!
//! Handles quoted fields (including embedded commas, quotes and newlines)
//! and both `\n` and `\r\n` line endings. Blank lines are skipped.

use crate::error::{AdvisorError, AdvisorResult};
use std::collections::HashSet;
use std::io::Write;

/// A parsed CSV table: header plus data rows tagged with their 1-based line
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<(usize, Vec<String>)>,
}

/// Parse CSV text into a header and rows.
///
/// Header names must be unique and every row must have as many fields
/// as the header.
pub fn parse(text: &str) -> AdvisorResult<CsvTable> {
    // Spreadsheet exports often start with a byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text)?.into_iter();

    let (header_line, header) = records.next().ok_or(AdvisorError::EmptyDataset)?;
    let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();

    let mut seen = HashSet::new();
    for name in &header {
        if !seen.insert(name.as_str()) {
            return Err(AdvisorError::MalformedInput {
                line: header_line,
                message: format!("duplicate column '{}'", name),
            });
        }
    }

    let mut rows = Vec::new();
    for (line, fields) in records {
        if fields.len() != header.len() {
            return Err(AdvisorError::MalformedInput {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    header.len(),
                    fields.len()
                ),
            });
        }
        rows.push((line, fields));
    }

    Ok(CsvTable { header, rows })
}

fn split_records(text: &str) -> AdvisorResult<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(AdvisorError::MalformedInput {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }

    fields.push(field);
    push_record(&mut records, record_line, fields);
    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    let blank = fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push((line, fields));
    }
}

/// Quote a field when it contains a delimiter, quote or line break
pub fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write one CSV record terminated by `\n`
pub fn write_record<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape(f.as_ref())).collect();
    writeln!(out, "{}", line.join(","))
}
