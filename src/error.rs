// Error types
// Caller-input errors are detected while building a plan, store errors while
// running one

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the anniversaries library
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown column '{0}' (expected who, date, type, note or rowid)")]
    UnknownColumn(String),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("column '{0}' cannot be used for ordering")]
    UnsortableColumn(String),

    #[error("ordering key '{0}' names no column")]
    EmptySortKey(String),

    #[error("a condition needs exactly three parts (column operator value), got {0}")]
    MalformedCondition(usize),

    #[error("rowid can only be compared to an integer, got '{0}'")]
    NonIntegerRowId(String),

    #[error("nothing to update: give at least one of --who, --date, --type or --note")]
    EmptyUpdate,

    #[error("raw SQL rejected: {0}")]
    InvalidRawSql(String),

    #[error("could not read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not create store directory {path}: {source}")]
    StoreDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("statement expects more parameters than the plan provides ({0} bound)")]
    MissingParameters(usize),

    #[error("{0} parameter(s) left over after the last statement")]
    ExtraParameters(usize),

    #[error(transparent)]
    Store(#[from] rusqlite::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
