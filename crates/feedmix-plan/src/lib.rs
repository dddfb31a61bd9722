pub mod adapter;
pub mod builder;
pub mod config;
pub mod extract;
pub mod item;
pub mod lexer;
pub mod pipeline;
pub mod sheet;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use adapter::{solve_plan, IntegerSolver, PlanSolution, Quantity, SolverError};
pub use builder::{build_problem, cap_constraint, CapKind, ModelBuilder, ModelDefinitionError, BUDGET_CONSTRAINT};
pub use config::{ItemCaps, PlanConfig, SolverSettings};
pub use extract::{extract, Allocation, Report, ResultExtractionError};
pub use item::{Item, ProductionProblem};
pub use lexer::{Lexer, Token, TokenKind};
pub use pipeline::{Outcome, OutputWriteError, Pipeline, PipelineError};
pub use sheet::{InputReadError, ItemParameters, Parameters, Sheet};
