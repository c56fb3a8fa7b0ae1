//! Transaction import from CSV and JSON exports

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionKind};

/// Recognized CSV layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvFormat {
    /// `Date,Type,Amount[,Description]` with an explicit income/expense column
    Typed,
    /// `Date,Description,Amount` bank export: negative = expense, positive = income
    Signed,
}

/// Detect CSV format from the header row
///
/// Returns None if the format is not recognized.
pub fn detect_format(headers: &StringRecord) -> Option<CsvFormat> {
    let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();

    match names.as_slice() {
        ["date", "type", "amount", ..] => Some(CsvFormat::Typed),
        ["date", "description", "amount", ..] => Some(CsvFormat::Signed),
        _ => None,
    }
}

/// Parse transactions from CSV, auto-detecting the layout
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let format = detect_format(&headers).ok_or_else(|| {
        Error::Import(format!(
            "Unrecognized CSV header: {} (expected Date,Type,Amount or Date,Description,Amount)",
            headers.iter().collect::<Vec<_>>().join(",")
        ))
    })?;

    let mut transactions = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = row + 2;

        let parsed = match format {
            CsvFormat::Typed => parse_typed_record(&record, line)?,
            CsvFormat::Signed => parse_signed_record(&record, line)?,
        };
        if let Some(tx) = parsed {
            transactions.push(tx);
        }
    }

    debug!(
        format = ?format,
        count = transactions.len(),
        "Parsed CSV transactions"
    );
    Ok(transactions)
}

/// Typed format: Date,Type,Amount[,Description]
fn parse_typed_record(record: &StringRecord, line: usize) -> Result<Option<Transaction>> {
    let date = parse_date(field(record, 0, "date", line)?)?;

    let kind_str = field(record, 1, "type", line)?;
    let kind: TransactionKind = kind_str
        .parse()
        .map_err(|e: String| Error::Import(format!("Line {}: {}", line, e)))?;

    let amount = parse_amount(field(record, 2, "amount", line)?)?.abs();

    let description = record
        .get(3)
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty());

    Ok(Some(Transaction {
        date,
        kind,
        amount,
        description,
    }))
}

/// Signed format: Date,Description,Amount (negative = expense)
fn parse_signed_record(record: &StringRecord, line: usize) -> Result<Option<Transaction>> {
    let date = parse_date(field(record, 0, "date", line)?)?;
    let description = field(record, 1, "description", line)?.to_string();
    let amount = parse_amount(field(record, 2, "amount", line)?)?;

    if amount == 0.0 {
        return Ok(None); // Nothing moved
    }

    let kind = if amount < 0.0 {
        TransactionKind::Expense
    } else {
        TransactionKind::Income
    };

    Ok(Some(Transaction {
        date,
        kind,
        amount: amount.abs(),
        description: Some(description).filter(|s| !s.is_empty()),
    }))
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str, line: usize) -> Result<&'r str> {
    record
        .get(index)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Import(format!("Line {}: missing {}", line, name)))
}

/// Parse transactions from a JSON array
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = serde_json::from_reader(reader)?;
    debug!(count = transactions.len(), "Parsed JSON transactions");
    Ok(transactions)
}

/// Load transactions from a file (`.json` as JSON, anything else as CSV)
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let reader = BufReader::new(File::open(path)?);

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json(reader)
    } else {
        parse_csv(reader)
    }
}

/// Parse a date in any of the common export formats
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))?;

    if !amount.is_finite() {
        return Err(Error::Import(format!("Amount is not a finite number: {}", s)));
    }
    Ok(amount)
}
