// Query Executor
// Runs a finished plan against the record store and formats what comes back

use super::plan::{QueryPlan, RenderMode};
use crate::error::{Error, Result};
use crate::storage::store::Store;
use crate::storage::Value;
use rusqlite::{params_from_iter, Batch};
use tracing::debug;

/// Runs plans against an open store
pub struct QueryExecutor {
    store: Store,
}

impl QueryExecutor {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Execute every statement of a plan in order
    ///
    /// Each statement takes as many values from `plan.params` as it has
    /// placeholders, and every value must be used. Statements that produce
    /// columns (selects and the trailing row reports) each yield one result
    /// set.
    pub fn execute(&self, plan: &QueryPlan) -> Result<Vec<QueryResult>> {
        let mut results = Vec::new();
        let mut params = plan.params.as_slice();
        let mut batch = Batch::new(self.store.connection(), &plan.text);

        while let Some(mut stmt) = batch.next()? {
            let count = stmt.parameter_count();
            if count > params.len() {
                return Err(Error::MissingParameters(params.len()));
            }
            let (bound, rest) = params.split_at(count);
            params = rest;

            let column_names: Vec<String> =
                stmt.column_names().iter().map(|c| c.to_string()).collect();
            let width = column_names.len();

            let mut rows = stmt.query(params_from_iter(bound.iter()))?;
            let mut values = Vec::new();
            while let Some(row) = rows.next()? {
                let row = (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                values.push(row);
            }

            if width > 0 {
                debug!(columns = width, rows = values.len(), "statement returned rows");
                results.push(QueryResult {
                    column_names,
                    rows: values,
                });
            }
        }

        if !params.is_empty() {
            return Err(Error::ExtraParameters(params.len()));
        }

        Ok(results)
    }
}

/// The rows one statement returned
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Format the result for display in the given render mode
    pub fn format(&self, mode: RenderMode) -> String {
        match mode {
            RenderMode::Tabular => self.format_table(),
            RenderMode::Record => self.format_lines(),
        }
    }

    /// A boxed table with a header row
    fn format_table(&self) -> String {
        if self.rows.is_empty() {
            return "No rows found".to_string();
        }

        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        // Calculate column widths
        let mut widths: Vec<usize> = self.column_names.iter().map(|c| c.chars().count()).collect();
        for row in &rows {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.chars().count());
            }
        }

        let mut result = String::new();
        result.push_str(&border(&widths, '┌', '┬', '┐'));
        result.push_str(&line(&self.column_names, &widths));
        result.push_str(&border(&widths, '├', '┼', '┤'));
        for row in &rows {
            result.push_str(&line(row, &widths));
        }
        result.push_str(&border(&widths, '└', '┴', '┘'));
        result.push_str(&format!("\n{} row(s)", rows.len()));

        result
    }

    /// One `column = value` line per column, records separated by a blank
    /// line, the way `sqlite3 .mode line` prints them
    fn format_lines(&self) -> String {
        let width = self
            .column_names
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);

        self.rows
            .iter()
            .map(|row| {
                self.column_names
                    .iter()
                    .zip(row)
                    .map(|(name, value)| format!("{:>width$} = {}", name, value, width = width))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}\n", left, segments.join(&middle.to_string()), right)
}

fn line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let mut out = String::from("│");
    for (cell, width) in cells.iter().zip(widths) {
        out.push_str(&format!(" {:<width$} │", cell.as_ref(), width = width));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::query::builder::{Interpreter, Request};
    use crate::query::parser::Condition;

    fn run(executor: &QueryExecutor, req: Request) -> Vec<QueryResult> {
        let plan = Interpreter::new(&Config::default()).build(&req).unwrap();
        executor.execute(&plan).unwrap()
    }

    fn add(executor: &QueryExecutor, who: &str, date: &str, kind: &str) -> i64 {
        let results = run(
            executor,
            Request {
                insert: true,
                who: Some(who.into()),
                date: Some(date.into()),
                kind: Some(kind.into()),
                ..Request::default()
            },
        );
        match results[0].rows[0][0] {
            Value::Integer(id) => id,
            ref other => panic!("expected rowid, got {:?}", other),
        }
    }

    fn executor() -> QueryExecutor {
        QueryExecutor::new(Store::in_memory().unwrap())
    }

    #[test]
    fn test_insert_reports_new_rowid() {
        let db = executor();
        assert_eq!(add(&db, "Joe", "2024-12-23", "birthday"), 1);
        assert_eq!(add(&db, "Ann", "2020-06-01", "marriage"), 2);
    }

    #[test]
    fn test_list_is_sorted_by_date() {
        let db = executor();
        add(&db, "Joe", "2024-12-23", "birthday");
        add(&db, "Ann", "2020-06-01", "marriage");
        add(&db, "Bob", "2022-01-15", "birthday");

        let results = run(&db, Request::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].column_names, vec!["rowid", "who", "date", "type", "note"]);
        let who: Vec<&Value> = results[0].rows.iter().map(|r| &r[1]).collect();
        assert_eq!(who, vec![&Value::from("Ann"), &Value::from("Bob"), &Value::from("Joe")]);
    }

    #[test]
    fn test_update_and_delete_report_changes() {
        let db = executor();
        let id = add(&db, "Joe", "2024-12-23", "birthday");

        let results = run(
            &db,
            Request {
                id: Some(id),
                update: true,
                note: Some("cake".into()),
                ..Request::default()
            },
        );
        assert_eq!(results[0].rows, vec![vec![Value::Integer(1)]]);

        let results = run(
            &db,
            Request {
                id: Some(id),
                ..Request::default()
            },
        );
        assert_eq!(results[0].rows[0][4], Value::from("cake"));

        let results = run(
            &db,
            Request {
                delete: Some(id),
                ..Request::default()
            },
        );
        assert_eq!(results[0].rows, vec![vec![Value::Integer(1)]]);

        let results = run(
            &db,
            Request {
                delete: Some(id),
                ..Request::default()
            },
        );
        assert_eq!(results[0].rows, vec![vec![Value::Integer(0)]]);
    }

    #[test]
    fn test_filter_and_page() {
        let db = executor();
        add(&db, "Joe", "2024-12-23", "birthday");
        add(&db, "Ann", "2020-06-01", "marriage");
        add(&db, "Bob", "2022-01-15", "birthday");
        add(&db, "Cid", "2021-03-03", "birthday");

        let results = run(
            &db,
            Request {
                filter: Some(Condition::parse(&["type", "=", "birthday"]).unwrap()),
                ..Request::default()
            },
        );
        assert_eq!(results[0].rows.len(), 3);

        let results = run(
            &db,
            Request {
                limit: Some(2),
                offset: Some(1),
                ..Request::default()
            },
        );
        let who: Vec<&Value> = results[0].rows.iter().map(|r| &r[1]).collect();
        assert_eq!(who, vec![&Value::from("Cid"), &Value::from("Bob")]);
    }

    #[test]
    fn test_quotes_in_values_are_stored_as_given() {
        let db = executor();
        add(&db, "O'Brien", "2023-05-05", "birthday");

        let results = run(
            &db,
            Request {
                filter: Some(Condition::parse(&["who", "=", "O'Brien"]).unwrap()),
                ..Request::default()
            },
        );
        assert_eq!(results[0].rows.len(), 1);
    }

    #[test]
    fn test_store_errors_surface() {
        let db = executor();
        let plan = QueryPlan::new("SELECT nothing FROM anniversaries", RenderMode::Tabular);
        assert!(matches!(db.execute(&plan), Err(Error::Store(_))));

        let plan = QueryPlan::new("SELECT rowid FROM anniversaries WHERE rowid = ?", RenderMode::Tabular);
        assert!(matches!(db.execute(&plan), Err(Error::MissingParameters(0))));

        let mut plan = QueryPlan::new("SELECT rowid FROM anniversaries WHERE rowid = ?", RenderMode::Tabular);
        plan.params = vec![Value::Integer(1), Value::Integer(2)];
        assert!(matches!(db.execute(&plan), Err(Error::ExtraParameters(1))));
    }

    #[test]
    fn test_raw_sql_is_judged_by_sqlite() {
        let db = executor();
        add(&db, "Joe", "2024-12-23", "birthday");
        add(&db, "Ann", "2020-06-01", "marriage");

        let results = run(
            &db,
            Request {
                raw: Some("SELECT who FROM anniversaries WHERE date GLOB '2024*'".into()),
                ..Request::default()
            },
        );
        assert_eq!(results[0].rows, vec![vec![Value::from("Joe")]]);

        let plan = Interpreter::new(&Config::default())
            .build(&Request {
                raw: Some("SELEC who".into()),
                ..Request::default()
            })
            .unwrap();
        assert!(matches!(db.execute(&plan), Err(Error::Store(_))));
    }

    #[test]
    fn test_format_table() {
        let result = QueryResult {
            column_names: vec!["rowid".into(), "who".into()],
            rows: vec![vec![Value::Integer(1), Value::from("Joe")]],
        };
        let expected = "\
┌───────┬─────┐
│ rowid │ who │
├───────┼─────┤
│ 1     │ Joe │
└───────┴─────┘

1 row(s)";
        assert_eq!(result.format(RenderMode::Tabular), expected);
    }

    #[test]
    fn test_format_empty_table() {
        let result = QueryResult {
            column_names: vec!["rowid".into()],
            rows: vec![],
        };
        assert_eq!(result.format(RenderMode::Tabular), "No rows found");
    }

    #[test]
    fn test_format_lines() {
        let result = QueryResult {
            column_names: vec!["rowid".into(), "who".into(), "note".into()],
            rows: vec![
                vec![Value::Integer(1), Value::from("Joe"), Value::Null],
                vec![Value::Integer(2), Value::from("Ann"), Value::from("x")],
            ],
        };
        assert_eq!(
            result.format(RenderMode::Record),
            "rowid = 1\n  who = Joe\n note = \n\nrowid = 2\n  who = Ann\n note = x"
        );
    }
}
