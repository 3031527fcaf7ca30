//! Per-column type frequency over CSV rows.
//!
//! Every cell is passed through [`guess_type`] and counted under its type
//! label. Timestamp cells are counted per matched layout name, so a column
//! mixing `RFC3339` and `RFC1123` values shows both. A column resolves to a
//! single type only when one label was ever observed; anything else resolves
//! to `Text`. Header cells sharing a name feed one merged column.

use std::{collections::BTreeMap, fmt, io::Read};

use encoding_rs::Encoding;
use log::{debug, trace};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::{
    guess::{GuessedValue, Type, guess_type},
    io_utils::{self, DecodeError},
};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Decode {
        row: usize,
        #[source]
        source: DecodeError,
    },
}

/// A type as counted per column; timestamps carry their layout name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeLabel {
    Null,
    Integer,
    Real,
    Boolean,
    Date,
    Timestamp(&'static str),
    Text,
}

impl TypeLabel {
    pub fn of(value: &GuessedValue) -> Self {
        match value {
            GuessedValue::Null => TypeLabel::Null,
            GuessedValue::Integer(_) => TypeLabel::Integer,
            GuessedValue::Real(_) => TypeLabel::Real,
            GuessedValue::Boolean(_) => TypeLabel::Boolean,
            GuessedValue::Date(_) => TypeLabel::Date,
            GuessedValue::Timestamp { format, .. } => TypeLabel::Timestamp(*format),
            GuessedValue::Text(_) => TypeLabel::Text,
        }
    }

    pub fn kind(&self) -> Type {
        match self {
            TypeLabel::Null => Type::Null,
            TypeLabel::Integer => Type::Integer,
            TypeLabel::Real => Type::Real,
            TypeLabel::Boolean => Type::Boolean,
            TypeLabel::Date => Type::Date,
            TypeLabel::Timestamp(_) => Type::Timestamp,
            TypeLabel::Text => Type::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeLabel::Timestamp(format) => *format,
            other => other.kind().as_str(),
        }
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TypeLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub counts: BTreeMap<TypeLabel, usize>,
}

impl ColumnStats {
    fn new(name: String) -> Self {
        Self {
            name,
            counts: BTreeMap::new(),
        }
    }

    fn record(&mut self, label: TypeLabel) {
        *self.counts.entry(label).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// The column's type when exactly one label was observed, else `Text`.
    pub fn resolve(&self) -> Type {
        let mut labels = self.counts.keys();
        match (labels.next(), labels.next()) {
            (Some(label), None) => label.kind(),
            _ => Type::Text,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeStats {
    columns: Vec<ColumnStats>,
    /// Index into `columns` for each cell position of a row.
    #[serde(skip)]
    slots: Vec<usize>,
    rows: usize,
}

impl TypeStats {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<ColumnStats> = Vec::new();
        let mut slots = Vec::new();
        for name in headers {
            let name = name.into();
            let slot = match columns.iter().position(|column| column.name == name) {
                Some(existing) => {
                    debug!("Header {name:?} repeats; counting its cells under one column");
                    existing
                }
                None => {
                    columns.push(ColumnStats::new(name));
                    columns.len() - 1
                }
            };
            slots.push(slot);
        }
        Self {
            columns,
            slots,
            rows: 0,
        }
    }

    /// Columns named `col001`, `col002`, ... for input without a header row.
    pub fn with_synthetic_headers(width: usize) -> Self {
        Self::new(synthetic_headers(width))
    }

    /// Counts one data row. Cells past the end of a short row count as
    /// `Null`; cells past the last column are ignored.
    pub fn ingest<S: AsRef<str>>(&mut self, row: &[S]) {
        if row.len() != self.slots.len() {
            trace!(
                "Row {} has {} cell(s) for {} header(s)",
                self.rows + 1,
                row.len(),
                self.slots.len()
            );
        }
        for (idx, &slot) in self.slots.iter().enumerate() {
            let guessed = match row.get(idx) {
                Some(cell) => guess_type(cell.as_ref()),
                None => GuessedValue::Null,
            };
            self.columns[slot].record(TypeLabel::of(&guessed));
        }
        self.rows += 1;
    }

    pub fn columns(&self) -> &[ColumnStats] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn rows_ingested(&self) -> usize {
        self.rows
    }

    /// `(column, label, count)` in column order, then label order.
    pub fn rows(&self) -> Vec<(&str, TypeLabel, usize)> {
        self.columns
            .iter()
            .flat_map(|column| {
                column
                    .counts
                    .iter()
                    .map(|(label, count)| (column.name.as_str(), *label, *count))
            })
            .collect()
    }

    pub fn resolved_types(&self) -> Vec<(&str, Type)> {
        self.columns
            .iter()
            .map(|column| (column.name.as_str(), column.resolve()))
            .collect()
    }
}

pub fn synthetic_headers(width: usize) -> Vec<String> {
    (1..=width).map(|idx| format!("col{idx:03}")).collect()
}

/// Reads every record from `reader` and counts guessed types per column.
///
/// With `has_headers` the first record names the columns; without it the
/// first record's width decides how many `colNNN` columns exist and the
/// record itself is counted as data. `reader` must be configured with
/// `has_headers(false)` so the header row arrives as a record.
pub fn gather_stats<R: Read>(
    reader: &mut csv::Reader<R>,
    has_headers: bool,
    encoding: &'static Encoding,
) -> Result<TypeStats, StatsError> {
    let mut records = reader.byte_records().enumerate();
    let mut stats = match records.next() {
        None => return Ok(TypeStats::default()),
        Some((_, first)) => {
            let first = first?;
            let decoded = decode_row(&first, encoding, 1)?;
            if has_headers {
                TypeStats::new(decoded)
            } else {
                let mut stats = TypeStats::with_synthetic_headers(decoded.len());
                stats.ingest(&decoded);
                stats
            }
        }
    };

    for (idx, record) in records {
        let record = record?;
        let decoded = decode_row(&record, encoding, idx + 1)?;
        stats.ingest(&decoded);
    }

    debug!(
        "Counted types across {} row(s) and {} column(s)",
        stats.rows_ingested(),
        stats.columns().len()
    );
    Ok(stats)
}

fn decode_row(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
    row: usize,
) -> Result<Vec<String>, StatsError> {
    io_utils::decode_record(record, encoding).map_err(|source| StatsError::Decode { row, source })
}
