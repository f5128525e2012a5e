// Input parser
// Turns the loose tokens a caller types (column names, operators, sort keys,
// raw SQL) into the closed set of terms the interpreter builds from
// Anything outside that set is rejected here, before any SQL is written
// Raw SQL is the exception: SQLite has the final word on it

use crate::error::{Error, Result};
use crate::query::plan::Direction;
use crate::storage::{Column, Value};
use serde::{Deserialize, Serialize};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Comparison operators accepted in a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
    Glob,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Glob => "GLOB",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::NotEq),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::LtEq),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::GtEq),
            "LIKE" => Ok(Operator::Like),
            "NOT LIKE" | "NOTLIKE" => Ok(Operator::NotLike),
            "GLOB" => Ok(Operator::Glob),
            _ => Err(Error::UnknownOperator(s.to_string())),
        }
    }
}

/// A single `column operator value` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: Column,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    /// Build a condition from the three tokens of `--where who = Joe`
    ///
    /// A comparison against `rowid` needs an integer; every other column is
    /// compared as text.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let [column, operator, value] = tokens else {
            return Err(Error::MalformedCondition(tokens.len()));
        };

        let column: Column = column.as_ref().parse()?;
        let operator: Operator = operator.as_ref().parse()?;
        let value = value.as_ref();

        let value = match column {
            Column::RowId => value
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| Error::NonIntegerRowId(value.to_string()))?,
            _ => Value::Text(value.to_string()),
        };

        Ok(Self {
            column,
            operator,
            value,
        })
    }
}

/// Parse one sort key
///
/// `+date` sorts ascending, `-date` descending and a bare `date` ascending.
pub fn parse_sort_key(key: &str) -> Result<(Column, Direction)> {
    let (direction, name) = match key.strip_prefix('-') {
        Some(rest) => (Direction::Desc, rest),
        None => (Direction::Asc, key.strip_prefix('+').unwrap_or(key)),
    };

    if name.is_empty() {
        return Err(Error::EmptySortKey(key.to_string()));
    }

    let column: Column = name.parse()?;
    if !column.is_sortable() {
        return Err(Error::UnsortableColumn(name.to_string()));
    }

    Ok((column, direction))
}

/// Parse every sort key of an `--ord` list
pub fn parse_sort_keys<S: AsRef<str>>(keys: &[S]) -> Result<Vec<(Column, Direction)>> {
    keys.iter().map(|k| parse_sort_key(k.as_ref())).collect()
}

/// Accept a raw fragment as long as it says something
///
/// The fragment is never rewritten. SQLite rejects bad SQL when the plan runs;
/// until then a fragment `sqlparser` cannot read only earns a warning, since
/// its SQLite dialect misses parts of the grammar (GLOB, most PRAGMAs).
pub fn check_raw_sql(sql: &str) -> Result<()> {
    if sql.trim().is_empty() {
        return Err(Error::InvalidRawSql("no statement given".to_string()));
    }

    if let Some(complaint) = lint_raw_sql(sql) {
        warn!(%complaint, "raw SQL may be rejected by the store");
    }

    Ok(())
}

/// What `sqlparser` dislikes about a fragment, if anything
pub fn lint_raw_sql(sql: &str) -> Option<String> {
    let dialect = SQLiteDialect {};
    Parser::parse_sql(&dialect, sql).err().map(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parses_text_value() {
        let cond = Condition::parse(&["who", "=", "Nabi"]).unwrap();
        assert_eq!(cond.column, Column::Who);
        assert_eq!(cond.operator, Operator::Eq);
        assert_eq!(cond.value, Value::Text("Nabi".into()));
    }

    #[test]
    fn test_condition_on_rowid_needs_integer() {
        let cond = Condition::parse(&["rowid", "<=", "20"]).unwrap();
        assert_eq!(cond.value, Value::Integer(20));

        let err = Condition::parse(&["rowid", "=", "twenty"]).unwrap_err();
        assert!(matches!(err, Error::NonIntegerRowId(_)));
    }

    #[test]
    fn test_condition_accepts_lowercase_like() {
        let cond = Condition::parse(&["type", "like", "b%"]).unwrap();
        assert_eq!(cond.operator, Operator::Like);
    }

    #[test]
    fn test_condition_rejects_unknown_tokens() {
        assert!(matches!(
            Condition::parse(&["name", "=", "x"]),
            Err(Error::UnknownColumn(_))
        ));
        assert!(matches!(
            Condition::parse(&["who", "; DROP", "x"]),
            Err(Error::UnknownOperator(_))
        ));
        assert!(matches!(
            Condition::parse(&["who", "="]),
            Err(Error::MalformedCondition(2))
        ));
    }

    #[test]
    fn test_sort_keys_follow_sign_prefix() {
        let keys = parse_sort_keys(&["+date", "-who", "type"]).unwrap();
        assert_eq!(
            keys,
            vec![
                (Column::Date, Direction::Asc),
                (Column::Who, Direction::Desc),
                (Column::Type, Direction::Asc),
            ]
        );
    }

    #[test]
    fn test_sort_key_rejects_rowid_and_empty() {
        assert!(matches!(parse_sort_key("-rowid"), Err(Error::UnsortableColumn(_))));
        assert!(matches!(parse_sort_key("+"), Err(Error::EmptySortKey(_))));
    }

    #[test]
    fn test_raw_sql_only_rejects_blank_input() {
        assert!(check_raw_sql("SELECT who FROM anniversaries WHERE rowid > 3").is_ok());
        assert!(check_raw_sql("SELECT * FROM anniversaries WHERE date GLOB '2024*'").is_ok());
        assert!(check_raw_sql("PRAGMA table_info(anniversaries)").is_ok());
        assert!(check_raw_sql("SELEC who").is_ok());
        assert!(matches!(check_raw_sql("   "), Err(Error::InvalidRawSql(_))));
        assert!(matches!(check_raw_sql(""), Err(Error::InvalidRawSql(_))));
    }

    #[test]
    fn test_lint_flags_unreadable_sql() {
        assert_eq!(lint_raw_sql("SELECT who FROM anniversaries WHERE rowid > 3"), None);
        assert!(lint_raw_sql("SELEC who").is_some());
    }
}
