//! Line-oriented record parsing and count aggregation
//!
//! One record per line: `STRING` or `STRING<TAB>COUNT`. Blank lines and
//! lines starting with `#` are skipped, strings are uppercased, and a missing
//! count defaults to 1. Records sharing a string are summed into a single key.
//!
//! Keys are restricted to ASCII: lengths and substitutions are measured per
//! byte, which equals per character only for ASCII text.

use crate::constants::DEFAULT_RECORD_COUNT;
use crate::error::{CorrectionError, Result};
use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A single input record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Uppercased string
    pub key: String,
    /// Weight of the record
    pub count: u64,
}

/// Parse one input line
///
/// Returns `Ok(None)` for lines that carry no record. Fields after the count
/// are ignored.
///
/// # Errors
/// Returns [`CorrectionError::MalformedRecord`] if the count field is not a
/// non-negative integer, or [`CorrectionError::NonAsciiKey`] if the key is
/// not ASCII
pub fn parse_record(line: &str, line_number: usize) -> Result<Option<Record>> {
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut fields = line.trim_end().split('\t');
    let key = fields.next().unwrap_or_default();
    if !key.is_ascii() {
        return Err(CorrectionError::NonAsciiKey {
            line: Some(line_number),
            key: key.to_string(),
        });
    }
    let key = key.to_ascii_uppercase();
    let count = match fields.next() {
        Some(field) => field.trim().parse::<u64>().map_err(|_| {
            CorrectionError::MalformedRecord {
                line: line_number,
                value: field.to_string(),
            }
        })?,
        None => DEFAULT_RECORD_COUNT,
    };

    Ok(Some(Record { key, count }))
}

/// Parse records from a reader and call a function for each of them
///
/// # Arguments
/// * `reader` - Buffered line source
/// * `callback` - Function called for each record, in input order
///
/// # Errors
/// Returns error if:
/// - Reading fails
/// - A count field is malformed or a key is not ASCII
/// - The callback fails
pub fn parse_records<R, F>(reader: R, mut callback: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(Record) -> Result<()>,
{
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(record) = parse_record(&line, i + 1)? {
            callback(record)?;
        }
    }
    Ok(())
}

/// Read and aggregate all records of a reader
///
/// # Errors
/// Returns error if a record is rejected by [`parse_record`] or the counts
/// overflow `u64` (see [`KeyCounts::add`])
pub fn read_records<R: BufRead>(reader: R) -> Result<KeyCounts> {
    let mut counts = KeyCounts::new();
    parse_records(reader, |record| counts.add(record.key, record.count))?;
    Ok(counts)
}

/// Read and aggregate all records of a file
pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<KeyCounts> {
    let file = File::open(path.as_ref())?;
    read_records(BufReader::new(file))
}

/// Aggregated count per distinct key, in order of first appearance
///
/// The grand total is tracked on insertion and always fits in `u64`, so any
/// partition of the keys into clusters has per-cluster totals that fit too.
#[derive(Debug, Clone, Default)]
pub struct KeyCounts {
    entries: Vec<(String, u64)>,
    positions: AHashMap<String, usize>,
    total: u64,
}

impl KeyCounts {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from (key, count) pairs, summing repeated keys
    ///
    /// # Errors
    /// Same as [`KeyCounts::add`]
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut counts = Self::new();
        for (key, count) in pairs {
            counts.add(key, count)?;
        }
        Ok(counts)
    }

    /// Add `count` to `key`
    ///
    /// # Errors
    /// Returns [`CorrectionError::NonAsciiKey`] if `key` is not ASCII, or
    /// [`CorrectionError::CountOverflow`] if the grand total would exceed
    /// `u64::MAX`. The table is left unchanged on error.
    pub fn add(&mut self, key: impl Into<String>, count: u64) -> Result<()> {
        let key = key.into();
        if !key.is_ascii() {
            return Err(CorrectionError::NonAsciiKey { line: None, key });
        }
        let Some(total) = self.total.checked_add(count) else {
            return Err(CorrectionError::CountOverflow { key });
        };
        self.total = total;
        // a key count never exceeds the grand total
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, count));
            }
        }
        Ok(())
    }

    /// Aggregated count of `key`
    pub fn get(&self, key: &str) -> Option<u64> {
        self.positions.get(key).map(|&pos| self.entries[pos].1)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no record was added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Iterate over (key, count) in order of first appearance
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }
}
