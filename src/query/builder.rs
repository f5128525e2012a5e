// Command interpreter
// Picks the one operation a request asks for and builds its plan

use super::parser::Condition;
use super::plan::{Direction, QueryPlan, RenderMode, SELECT_ALL};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::{Column, Value, TABLE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Everything a caller can ask for in one invocation, already typed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: Option<i64>,
    pub insert: bool,
    pub update: bool,
    pub delete: Option<i64>,
    pub who: Option<String>,
    pub date: Option<String>,
    pub kind: Option<String>,
    pub note: Option<String>,
    pub filter: Option<Condition>,
    pub and: Option<Condition>,
    pub or: Option<Condition>,
    pub order: Vec<(Column, Direction)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub raw: Option<String>,
}

impl Request {
    /// The four record fields in table order
    fn fields(&self) -> [(Column, Option<&str>); 4] {
        [
            (Column::Who, self.who.as_deref()),
            (Column::Date, self.date.as_deref()),
            (Column::Type, self.kind.as_deref()),
            (Column::Note, self.note.as_deref()),
        ]
    }

    /// Fields that carry a value; empty strings count as absent
    fn present_fields(&self) -> Vec<(Column, &str)> {
        self.fields()
            .into_iter()
            .filter_map(|(column, value)| value.filter(|v| !v.is_empty()).map(|v| (column, v)))
            .collect()
    }
}

/// The operation a request resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Insert,
    Update(i64),
    SelectById(i64),
    Delete(i64),
    Paginate,
    Order,
    Filter,
    Raw,
    SelectAll,
}

impl Operation {
    /// Resolve the operation, first match wins
    /// The order of the checks is part of the tool's contract
    pub fn select(req: &Request) -> Self {
        if req.insert {
            Operation::Insert
        } else if let Some(id) = req.id {
            if req.update {
                Operation::Update(id)
            } else {
                Operation::SelectById(id)
            }
        } else if let Some(id) = req.delete {
            Operation::Delete(id)
        } else if req.limit.is_some() {
            Operation::Paginate
        } else if !req.order.is_empty() {
            Operation::Order
        } else if req.filter.is_some() {
            Operation::Filter
        } else if req.raw.is_some() {
            Operation::Raw
        } else {
            Operation::SelectAll
        }
    }
}

/// Builds query plans from requests
pub struct Interpreter {
    default_render_mode: RenderMode,
}

impl Interpreter {
    /// Create an interpreter that lists results in the configured render mode
    pub fn new(config: &Config) -> Self {
        Self {
            default_render_mode: config.default_render_mode,
        }
    }

    /// Build the finished plan for a request
    pub fn build(&self, req: &Request) -> Result<QueryPlan> {
        let operation = Operation::select(req);
        warn_shadowed(operation, req);

        let plan = match operation {
            Operation::Insert => insert(req),
            Operation::Update(id) => update(id, req)?,
            Operation::SelectById(id) => select_by_id(id),
            Operation::Delete(id) => delete(id),
            Operation::Paginate | Operation::Order => {
                let plan = self.select_all().order_by(&req.order);
                paginate(plan, req)
            }
            // Ordering and limit outrank a filter, so neither is set here
            Operation::Filter => {
                let plan = req
                    .filter
                    .iter()
                    .fold(self.select_all(), |plan, cond| filter(plan, cond));
                extend_filter(plan, req.and.as_ref(), req.or.as_ref())
            }
            Operation::Raw => raw(req.raw.as_deref().unwrap_or_default(), self.default_render_mode)?,
            Operation::SelectAll => self.select_all(),
        };

        let plan = plan.default_order();
        debug!(
            ?operation,
            order_clauses = plan.order_clause_count(),
            sql = %plan,
            "built plan"
        );
        Ok(plan)
    }

    fn select_all(&self) -> QueryPlan {
        QueryPlan::select_all(self.default_render_mode)
    }
}

fn insert(req: &Request) -> QueryPlan {
    let plan = QueryPlan::new(
        format!("INSERT INTO {} (who, date, type, note) VALUES (", TABLE),
        RenderMode::Record,
    );

    let plan = req
        .fields()
        .into_iter()
        .enumerate()
        .fold(plan, |plan, (i, (_, value))| {
            let plan = if i == 0 { plan } else { plan.push_sql(", ") };
            plan.push_param(Value::text_or_null(value))
        });

    plan.push_sql("); SELECT last_insert_rowid() AS \"created\"")
        .with_message("Anniversary created")
}

fn update(id: i64, req: &Request) -> Result<QueryPlan> {
    let fields = req.present_fields();
    if fields.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    let plan = QueryPlan::new(format!("UPDATE {} SET ", TABLE), RenderMode::Record);
    let plan = fields
        .into_iter()
        .enumerate()
        .fold(plan, |plan, (i, (column, value))| {
            let plan = if i == 0 { plan } else { plan.push_sql(", ") };
            plan.push_sql(&format!("{} = ", column)).push_param(value)
        });

    Ok(plan
        .push_sql(" WHERE rowid = ")
        .push_param(id)
        .push_sql("; SELECT changes() AS \"updated\"")
        .with_message("Anniversary updated"))
}

fn select_by_id(id: i64) -> QueryPlan {
    QueryPlan::new(format!("{} WHERE rowid = ", SELECT_ALL), RenderMode::Record).push_param(id)
}

fn delete(id: i64) -> QueryPlan {
    QueryPlan::new(format!("DELETE FROM {} WHERE rowid = ", TABLE), RenderMode::Record)
        .push_param(id)
        .push_sql("; SELECT changes() AS \"deleted\"")
        .with_message("Anniversary deleted")
}

fn condition(plan: QueryPlan, keyword: &str, cond: &Condition) -> QueryPlan {
    plan.push_sql(&format!(" {} {} {} ", keyword, cond.column, cond.operator))
        .push_param(cond.value.clone())
}

fn filter(plan: QueryPlan, cond: &Condition) -> QueryPlan {
    condition(plan, "WHERE", cond).orderable()
}

/// AND is always written before OR
fn extend_filter(plan: QueryPlan, and: Option<&Condition>, or: Option<&Condition>) -> QueryPlan {
    let plan = match and {
        Some(cond) => condition(plan, "AND", cond),
        None => plan,
    };
    match or {
        Some(cond) => condition(plan, "OR", cond),
        None => plan,
    }
}

fn paginate(plan: QueryPlan, req: &Request) -> QueryPlan {
    match req.limit {
        Some(limit) => plan.paginate(limit, req.offset),
        None => plan,
    }
}

fn raw(sql: &str, render_mode: RenderMode) -> Result<QueryPlan> {
    super::parser::check_raw_sql(sql)?;
    Ok(QueryPlan::new(sql, render_mode))
}

/// Tell the operator about inputs the chosen operation does not use
fn warn_shadowed(operation: Operation, req: &Request) {
    for flag in shadowed_inputs(operation, req) {
        warn!(?operation, "{} ignored", flag);
    }
}

/// The flags of a request that the chosen operation leaves unused
pub fn shadowed_inputs(operation: Operation, req: &Request) -> Vec<&'static str> {
    let mut ignored = Vec::new();

    let uses_fields = matches!(operation, Operation::Insert | Operation::Update(_));
    if !uses_fields && !req.present_fields().is_empty() {
        ignored.push("--who/--date/--type/--note");
    }
    if req.update && !matches!(operation, Operation::Update(_)) {
        ignored.push("--mod");
    }
    if req.delete.is_some() && !matches!(operation, Operation::Delete(_)) {
        ignored.push("--del");
    }

    let reads = matches!(
        operation,
        Operation::Paginate | Operation::Order | Operation::Filter
    );
    if req.filter.is_some() && operation != Operation::Filter {
        ignored.push("--where");
    }
    if (req.and.is_some() || req.or.is_some()) && operation != Operation::Filter {
        ignored.push("--and/--or");
    }
    if !req.order.is_empty() && !reads {
        ignored.push("--ord");
    }
    if req.limit.is_some() && !reads {
        ignored.push("--lim");
    }
    if req.offset.is_some() && (req.limit.is_none() || !reads) {
        ignored.push("--ofs");
    }
    if req.raw.is_some() && operation != Operation::Raw {
        ignored.push("--sql");
    }

    ignored
}
