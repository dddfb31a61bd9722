use thiserror::Error;

use crate::solution::ConstraintViolation;

/// Represents a linear (or integer) programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
    /// Integrality flag for each variable
    pub integer: Vec<bool>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    /// The operator that holds after both sides are multiplied by -1
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("{name} has {found} coefficients but the problem has {expected} variables")]
    DimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite value in {0}")]
    NonFinite(String),
}

impl Constraint {
    /// Left-hand side value of this constraint at `values`
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Whether `lhs` satisfies this constraint within `tolerance`
    pub fn is_satisfied(&self, lhs: f64, tolerance: f64) -> bool {
        match self.op {
            ConstraintOp::Le => lhs <= self.rhs + tolerance,
            ConstraintOp::Ge => lhs >= self.rhs - tolerance,
            ConstraintOp::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
            integer: vec![false; n],
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    /// Restrict a variable to integer values
    pub fn set_integer(&mut self, index: usize) {
        if let Some(flag) = self.integer.get_mut(index) {
            *flag = true;
        }
    }

    pub fn is_integer(&self, index: usize) -> bool {
        self.integer.get(index).copied().unwrap_or(false)
    }

    pub fn has_integer_variables(&self) -> bool {
        self.integer.iter().any(|&flag| flag)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check that every coefficient vector matches the variable count and that all numbers are finite
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();
        let check_len = |name: &str, found: usize| {
            if found == n {
                Ok(())
            } else {
                Err(ProblemError::DimensionMismatch {
                    name: name.to_string(),
                    expected: n,
                    found,
                })
            }
        };

        check_len("objective", self.objective.coefficients.len())?;
        check_len("integrality flags", self.integer.len())?;
        if self.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite("objective".to_string()));
        }

        for c in &self.constraints {
            check_len(&c.name, c.coefficients.len())?;
            if !c.rhs.is_finite() || c.coefficients.iter().any(|x| !x.is_finite()) {
                return Err(ProblemError::NonFinite(c.name.clone()));
            }
        }

        Ok(())
    }

    /// Objective function value at `values`
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Left-hand side value of every constraint at `values`, in constraint order
    pub fn activities(&self, values: &[f64]) -> Vec<f64> {
        self.constraints.iter().map(|c| c.activity(values)).collect()
    }

    /// Find which constraints are violated by a given assignment
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for c in &self.constraints {
            let lhs = c.activity(values);
            if c.is_satisfied(lhs, tolerance) {
                continue;
            }

            let (violation_amount, description) = match c.op {
                ConstraintOp::Le => {
                    let amt = lhs - c.rhs;
                    (amt, format!("{} exceeds maximum of {} by {}", c.name, c.rhs, amt))
                }
                ConstraintOp::Ge => {
                    let amt = c.rhs - lhs;
                    (amt, format!("{} is below minimum of {} by {}", c.name, c.rhs, amt))
                }
                ConstraintOp::Eq => (
                    (lhs - c.rhs).abs(),
                    format!("{} requires exactly {} but got {}", c.name, c.rhs, lhs),
                ),
            };

            violations.push(ConstraintViolation {
                constraint: c.name.clone(),
                required: c.rhs,
                actual: lhs,
                violation_amount,
                description,
            });
        }

        // Worst first
        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_var_problem() -> LpProblem {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_min", vec![1.0, 0.0], ConstraintOp::Ge, 1.0);
        problem
    }

    #[test]
    fn test_validate_dimension_mismatch() {
        let mut problem = two_var_problem();
        problem.add_constraint("broken", vec![1.0], ConstraintOp::Le, 1.0);
        let err = problem.validate().unwrap_err();
        assert_eq!(
            err,
            ProblemError::DimensionMismatch {
                name: "broken".to_string(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_validate_non_finite() {
        let mut problem = two_var_problem();
        problem.add_constraint("nan", vec![1.0, f64::NAN], ConstraintOp::Le, 1.0);
        assert_eq!(problem.validate(), Err(ProblemError::NonFinite("nan".to_string())));
    }

    #[test]
    fn test_violations_sorted_worst_first() {
        let problem = two_var_problem();
        assert!(problem.violations(&[1.0, 2.0], 1e-9).is_empty());

        let violations = problem.violations(&[0.0, 9.0], 1e-9);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].constraint, "sum");
        assert!((violations[0].violation_amount - 5.0).abs() < 1e-9);
        assert_eq!(violations[1].constraint, "x_min");
    }

    #[test]
    fn test_small_violation_keeps_precision() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.add_constraint("budget", vec![1000.0], ConstraintOp::Le, 999.9995);

        let violations = problem.violations(&[1.0], 1e-6);
        assert_eq!(violations.len(), 1);
        let description = &violations[0].description;
        assert!(description.starts_with("budget exceeds maximum of 999.9995 by 0.000"), "{}", description);
        assert!(!description.ends_with("by 0.00"));
        assert!(violations[0].violation_amount > 4e-4);
    }

    #[test]
    fn test_integer_flags() {
        let mut problem = two_var_problem();
        assert!(!problem.has_integer_variables());
        problem.set_integer(1);
        problem.set_integer(7);
        assert!(!problem.is_integer(0));
        assert!(problem.is_integer(1));
        assert!(problem.has_integer_variables());
    }
}
