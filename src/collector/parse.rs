//! Line splitting and field coercion
//!
//! Boards print columns separated by spaces, commas, or a handful of other
//! punctuation. All of them are folded into whitespace before splitting.

use crate::error::CaptureError;
use std::fmt;

/// Characters treated as column separators in addition to whitespace
pub const DELIMITERS: &[char] = &[';', '|', ':', ','];

/// A single parsed field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Coerce a field: integer first, then float, otherwise keep the text
    pub fn parse(field: &str) -> Self {
        if let Ok(i) = field.parse::<i64>() {
            Value::Integer(i)
        } else if let Ok(f) = field.parse::<f64>() {
            Value::Float(f)
        } else {
            Value::Text(field.to_string())
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            // Debug keeps the decimal point on whole floats so they re-parse as floats
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One parsed data line
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub values: Vec<Value>,
}

impl Reading {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Split a line into fields
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_whitespace() || DELIMITERS.contains(&c))
        .filter(|field| !field.is_empty())
        .collect()
}

/// Column names from a header line such as `Integers, Floats`
pub fn parse_header(line: &str) -> Vec<String> {
    split_fields(line).into_iter().map(str::to_string).collect()
}

/// Generated column names for boards that do not print a header
pub fn default_headers(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Col{}", i)).collect()
}

/// Parse a data line against the session's columns
pub fn parse_line(line: &str, columns: &[String]) -> Result<Reading, CaptureError> {
    let fields = split_fields(line);
    if fields.len() != columns.len() {
        return Err(CaptureError::MalformedRow {
            expected: columns.len(),
            found: fields.len(),
            line: line.to_string(),
        });
    }

    Ok(Reading::new(fields.into_iter().map(Value::parse).collect()))
}
