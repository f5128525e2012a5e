// Query module - turns requests into plans and runs them
pub mod builder;
pub mod executor;
pub mod parser;
pub mod plan;

pub use builder::Interpreter;
pub use executor::QueryExecutor;
pub use plan::QueryPlan;
