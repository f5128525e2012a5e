// Storage module - the record store contract
// The store itself is SQLite; this module only describes the shape of the
// anniversaries table and the values that travel to and from it

pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Name of the single table holding anniversary records
pub const TABLE: &str = "anniversaries";

/// Statement creating the table when the store is new
pub const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS anniversaries (who TEXT, date TEXT, type TEXT, note TEXT)";

/// A column of the anniversaries table
/// `RowId` is SQLite's implicit row identifier, the other four are the
/// record fields in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    RowId,
    Who,
    Date,
    Type,
    Note,
}

impl Column {
    /// The record fields in table order
    /// Insert values, update assignments and ordering terms all follow it
    pub const FIELDS: [Column; 4] = [Column::Who, Column::Date, Column::Type, Column::Note];

    /// The column name as it appears in SQL text
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::RowId => "rowid",
            Column::Who => "who",
            Column::Date => "date",
            Column::Type => "type",
            Column::Note => "note",
        }
    }

    /// Whether the column can appear in an ordering term
    pub fn is_sortable(&self) -> bool {
        !matches!(self, Column::RowId)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = Error;

    /// Column names are matched case-insensitively
    /// `id` is accepted as a shorthand for `rowid`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rowid" | "id" => Ok(Column::RowId),
            "who" => Ok(Column::Who),
            "date" => Ok(Column::Date),
            "type" => Ok(Column::Type),
            "note" => Ok(Column::Note),
            _ => Err(Error::UnknownColumn(s.to_string())),
        }
    }
}

/// A value bound to a statement placeholder or read back from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// A text value, or NULL when the field was not given
    /// An empty string counts as not given
    pub fn text_or_null(field: Option<&str>) -> Value {
        match field {
            Some(s) if !s.is_empty() => Value::Text(s.to_string()),
            _ => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    /// NULL renders as an empty cell, the way the sqlite3 shell shows it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
