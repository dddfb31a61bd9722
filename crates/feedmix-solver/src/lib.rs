mod branch;
mod problem;
mod simplex;
mod solution;

pub use branch::BranchAndBound;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, ProblemError};
pub use simplex::Solver;
pub use solution::{Analysis, ConstraintViolation, RowActivity, Solution, SolutionStatus};
