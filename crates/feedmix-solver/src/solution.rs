use std::fmt;

use crate::problem::LpProblem;

/// The result of solving an LP or IP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each variable (empty unless optimal)
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Row activity at the returned point
    pub analysis: Analysis,
    /// Why the solver stopped, for non-optimal outcomes
    pub message: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// Solver failed or hit a search limit
    Error,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolutionStatus::Optimal => "OPTIMAL",
            SolutionStatus::Infeasible => "INFEASIBLE",
            SolutionStatus::Unbounded => "UNBOUNDED",
            SolutionStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Constraint usage at the returned point
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Left-hand side and slack for each constraint
    pub rows: Vec<RowActivity>,
    /// Which constraints are binding (tight) at the returned point
    pub binding_constraints: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct RowActivity {
    /// Constraint name
    pub constraint: String,
    /// Left-hand side value
    pub activity: f64,
    /// Distance to the right-hand side
    pub slack: f64,
}

/// Information about a violated constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ConstraintViolation {
    /// Constraint name
    pub constraint: String,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    /// Build an optimal solution from variable values, recomputing the objective and row activity
    pub fn optimal(problem: &LpProblem, values: Vec<f64>, tolerance: f64) -> Self {
        let objective_value = problem.objective_value(&values);
        let analysis = Analysis::evaluate(problem, &values, tolerance);
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            analysis,
            message: None,
        }
    }

    pub fn infeasible() -> Self {
        Self::without_values(SolutionStatus::Infeasible, None)
    }

    pub fn unbounded() -> Self {
        Self::without_values(SolutionStatus::Unbounded, None)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::without_values(SolutionStatus::Error, Some(message.into()))
    }

    fn without_values(status: SolutionStatus, message: Option<String>) -> Self {
        let objective_value = match status {
            SolutionStatus::Unbounded => f64::INFINITY,
            _ => f64::NAN,
        };
        Self {
            status,
            values: Vec::new(),
            objective_value,
            analysis: Analysis::default(),
            message,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

impl Analysis {
    pub fn evaluate(problem: &LpProblem, values: &[f64], tolerance: f64) -> Self {
        let rows: Vec<RowActivity> = problem
            .constraints
            .iter()
            .map(|c| {
                let activity = c.activity(values);
                RowActivity {
                    constraint: c.name.clone(),
                    activity,
                    slack: (c.rhs - activity).abs(),
                }
            })
            .collect();

        let binding_constraints = rows
            .iter()
            .filter(|row| row.slack <= tolerance)
            .map(|row| row.constraint.clone())
            .collect();

        Self {
            rows,
            binding_constraints,
        }
    }
}
