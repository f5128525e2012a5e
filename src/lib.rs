// anniversaries - a small query builder for a personal table of anniversaries
// This is the library root that exposes the public API

pub mod config;
pub mod error;
pub mod query;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use query::{
    builder::{Interpreter, Operation, Request},
    executor::{QueryExecutor, QueryResult},
    parser::{Condition, Operator},
    plan::{Direction, QueryPlan, RenderMode},
};
pub use storage::{store::Store, Column, Value};
