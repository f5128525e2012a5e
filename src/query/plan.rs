// Query plan
// The value the interpreter builds and the executor consumes
// Every clause step takes the plan by value and hands back the next one, so a
// plan has exactly one owner at any point of the pipeline

use crate::storage::{Column, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The base read statement every list query starts from
pub const SELECT_ALL: &str = "SELECT rowid, * FROM anniversaries";

/// How the presenter shows the results of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// One row per line under a header (sqlite3 `.mode column`)
    #[default]
    #[serde(rename = "column", alias = "tabular")]
    Tabular,
    /// One `column = value` line per field (sqlite3 `.mode line`)
    #[serde(rename = "line", alias = "record")]
    Record,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Tabular => f.write_str("column"),
            RenderMode::Record => f.write_str("line"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "column" | "tabular" | "table" => Ok(RenderMode::Tabular),
            "line" | "record" => Ok(RenderMode::Record),
            _ => Err(format!("unknown render mode '{}' (expected column or line)", s)),
        }
    }
}

/// Sort direction of an ordering term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A finished or in-progress query
///
/// `text` holds one or more `;`-separated statements with `?` placeholders and
/// `params` the values bound to them, in placeholder order. Once an operation
/// has been chosen the text is only ever appended to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub text: String,
    pub params: Vec<Value>,
    /// Set on read paths until an ordering clause has been written
    pub needs_default_order: bool,
    pub render_mode: RenderMode,
    pub message: Option<String>,
}

impl QueryPlan {
    /// Start a plan from a statement
    pub fn new(text: impl Into<String>, render_mode: RenderMode) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
            needs_default_order: false,
            render_mode,
            message: None,
        }
    }

    /// The unfiltered list of every record
    pub fn select_all(render_mode: RenderMode) -> Self {
        Self::new(SELECT_ALL, render_mode).orderable()
    }

    /// Mark the plan as a read path still waiting for an ordering
    pub fn orderable(mut self) -> Self {
        self.needs_default_order = true;
        self
    }

    /// Append raw statement text
    pub fn push_sql(mut self, sql: &str) -> Self {
        self.text.push_str(sql);
        self
    }

    /// Append a `?` placeholder and bind its value
    pub fn push_param(mut self, value: impl Into<Value>) -> Self {
        self.text.push('?');
        self.params.push(value.into());
        self
    }

    /// Attach the message shown after execution
    /// Only the first message sticks
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        if self.message.is_none() {
            self.message = Some(message.into());
        }
        self
    }

    /// Append an explicit ordering clause
    ///
    /// Terms come out in table field order (who, date, type, note) whatever
    /// order they were given in; when a column appears twice the last
    /// direction wins. An empty term list leaves the plan untouched.
    pub fn order_by(mut self, terms: &[(Column, Direction)]) -> Self {
        let clauses: Vec<String> = Column::FIELDS
            .iter()
            .filter_map(|column| {
                terms
                    .iter()
                    .rev()
                    .find(|(c, _)| c == column)
                    .map(|(c, dir)| format!("{} {}", c, dir.as_sql()))
            })
            .collect();

        if clauses.is_empty() {
            return self;
        }

        self.text.push_str(" ORDER BY ");
        self.text.push_str(&clauses.join(", "));
        self.needs_default_order = false;
        self
    }

    /// Append `ORDER BY date ASC` if no ordering has been written yet
    /// Calling it again is a no-op
    pub fn default_order(mut self) -> Self {
        if self.needs_default_order {
            self.text.push_str(" ORDER BY date ASC");
            self.needs_default_order = false;
        }
        self
    }

    /// Append LIMIT and an optional OFFSET
    /// A plan still waiting for an ordering gets the default one first so a
    /// page is always taken from a sorted result
    pub fn paginate(self, limit: u64, offset: Option<u64>) -> Self {
        let plan = self
            .default_order()
            .push_sql(" LIMIT ")
            .push_param(clamp(limit));

        match offset {
            Some(offset) => plan.push_sql(" OFFSET ").push_param(clamp(offset)),
            None => plan,
        }
    }

    /// Number of ORDER BY clauses in the text
    pub fn order_clause_count(&self) -> usize {
        self.text.matches("ORDER BY").count()
    }
}

/// SQLite integers are signed 64-bit
fn clamp(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl fmt::Display for QueryPlan {
    /// The statement text followed by its bound values
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| format!("{:?}", p)).collect();
            write!(f, " -- [{}]", params.join(", "))?;
        }
        Ok(())
    }
}
