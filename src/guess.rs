//! Scalar type guessing for raw text values.
//!
//! [`guess_type`] tries an ordered cascade of interpretations and returns the
//! first one that fits. It never fails: anything unrecognised is [`Text`].
//!
//! [`Text`]: GuessedValue::Text

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Type {
    Null,
    Integer,
    Real,
    Boolean,
    Date,
    Timestamp,
    Text,
}

impl Type {
    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Null => "Null",
            Type::Integer => "Integer",
            Type::Real => "Real",
            Type::Boolean => "Boolean",
            Type::Date => "Date",
            Type::Timestamp => "Timestamp",
            Type::Text => "Text",
        }
    }

    /// Column type used when rendering DDL. Columns that only ever held nulls
    /// are declared as text.
    pub fn sql_name(&self) -> &'static str {
        match self {
            Type::Integer => "integer",
            Type::Real => "real",
            Type::Boolean => "boolean",
            Type::Date => "date",
            Type::Timestamp => "timestamp",
            Type::Null | Type::Text => "text",
        }
    }

    pub fn variants() -> &'static [Type] {
        &[
            Type::Null,
            Type::Integer,
            Type::Real,
            Type::Boolean,
            Type::Date,
            Type::Timestamp,
            Type::Text,
        ]
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Type {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Type::variants()
            .iter()
            .copied()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown type '{value}'. Supported types: {}",
                    Type::variants()
                        .iter()
                        .map(Type::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// The verdict for a single value, carrying the payload of the matched type.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessedValue {
    Null,
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp {
        value: DateTime<FixedOffset>,
        format: &'static str,
    },
    Text(String),
}

impl GuessedValue {
    pub fn kind(&self) -> Type {
        match self {
            GuessedValue::Null => Type::Null,
            GuessedValue::Integer(_) => Type::Integer,
            GuessedValue::Real(_) => Type::Real,
            GuessedValue::Boolean(_) => Type::Boolean,
            GuessedValue::Date(_) => Type::Date,
            GuessedValue::Timestamp { .. } => Type::Timestamp,
            GuessedValue::Text(_) => Type::Text,
        }
    }

    /// Name of the timestamp layout that matched, if this is a timestamp.
    pub fn timestamp_format(&self) -> Option<&'static str> {
        match self {
            GuessedValue::Timestamp { format, .. } => Some(*format),
            _ => None,
        }
    }
}

pub fn guess_type(value: &str) -> GuessedValue {
    if value.is_empty() || value == "null" {
        return GuessedValue::Null;
    }

    if let Some(integer) = parse_integer(value) {
        return GuessedValue::Integer(integer);
    }

    if let Ok(real) = value.parse::<f64>() {
        return GuessedValue::Real(real);
    }

    if let Some(flag) = parse_boolean(value) {
        return GuessedValue::Boolean(flag);
    }

    if let Some((instant, format)) = timestamp::parse_timestamp(value) {
        return GuessedValue::Timestamp {
            value: instant,
            format: format.name,
        };
    }

    GuessedValue::Text(value.to_string())
}

// `i64::from_str` tolerates a leading '+', which is not an integer here.
fn parse_integer(value: &str) -> Option<i64> {
    if value.starts_with('+') {
        return None;
    }
    value.parse().ok()
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "t" => Some(true),
        "false" | "no" | "f" => Some(false),
        _ => None,
    }
}
