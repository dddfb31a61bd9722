use feedmix_solver::{BranchAndBound, LpProblem, Solution, SolutionStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::item::ProductionProblem;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Solver finished with status {status}{}", with_colon(.detail))]
    NotOptimal {
        status: SolutionStatus,
        detail: Option<String>,
    },
}

fn with_colon(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
}

/// Anything that can solve the integer program of a [`ProductionProblem`]
pub trait IntegerSolver {
    fn solve(&self, problem: &LpProblem) -> Solution;

    /// Tolerance for checking the returned point against the constraints
    fn feasibility_tolerance(&self) -> f64 {
        1e-6
    }
}

impl IntegerSolver for BranchAndBound {
    fn solve(&self, problem: &LpProblem) -> Solution {
        BranchAndBound::solve(self, problem)
    }

    fn feasibility_tolerance(&self) -> f64 {
        BranchAndBound::feasibility_tolerance(self)
    }
}

/// Chosen quantity for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub name: String,
    pub quantity: u64,
}

/// Outcome of one solve, independent of the problem it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSolution {
    pub status: SolutionStatus,
    /// One entry per item in item order; empty unless optimal
    pub quantities: Vec<Quantity>,
    /// Total profit; zero unless optimal
    pub objective_value: f64,
    /// Constraints with no slack left
    pub binding_constraints: Vec<String>,
    /// Solver diagnostics for non-optimal outcomes
    pub message: Option<String>,
}

impl PlanSolution {
    fn failed(status: SolutionStatus, message: Option<String>) -> Self {
        Self {
            status,
            quantities: Vec::new(),
            objective_value: 0.0,
            binding_constraints: Vec::new(),
            message,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Quantities in item order
    pub fn values(&self) -> Vec<u64> {
        self.quantities.iter().map(|q| q.quantity).collect()
    }

    pub fn quantity(&self, name: &str) -> Option<u64> {
        self.quantities.iter().find(|q| q.name == name).map(|q| q.quantity)
    }

    /// Surface a non-optimal status as an error
    pub fn ensure_optimal(&self) -> Result<&Self, SolverError> {
        if self.is_optimal() {
            Ok(self)
        } else {
            Err(SolverError::NotOptimal {
                status: self.status,
                detail: self.message.clone(),
            })
        }
    }
}

/// Solve `problem` with `solver`, leaving the problem untouched
pub fn solve_plan<S: IntegerSolver + ?Sized>(problem: &ProductionProblem, solver: &S) -> PlanSolution {
    let lp = problem.lp();
    let solution = solver.solve(lp);

    if solution.status != SolutionStatus::Optimal {
        debug!(status = %solution.status, "solver did not reach optimality");
        return PlanSolution::failed(solution.status, solution.message);
    }

    if solution.values.len() != lp.num_variables() {
        return PlanSolution::failed(
            SolutionStatus::Error,
            Some(format!(
                "solver returned {} values for {} items",
                solution.values.len(),
                lp.num_variables()
            )),
        );
    }

    let values: Vec<f64> = solution.values.iter().map(|v| v.round().max(0.0)).collect();

    // An optimal answer must satisfy every constraint of the model
    let violations = lp.violations(&values, solver.feasibility_tolerance());
    if let Some(worst) = violations.first() {
        warn!(constraint = %worst.constraint, "solver returned an infeasible point");
        return PlanSolution::failed(SolutionStatus::Error, Some(worst.description.clone()));
    }

    let quantities = problem
        .items()
        .iter()
        .zip(&values)
        .map(|(item, &v)| Quantity {
            name: item.name.clone(),
            quantity: v as u64,
        })
        .collect();

    PlanSolution {
        status: SolutionStatus::Optimal,
        quantities,
        objective_value: lp.objective_value(&values),
        binding_constraints: solution.analysis.binding_constraints,
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_problem;
    use crate::item::Item;

    /// Returns a canned solution regardless of the problem
    struct Canned(Solution);

    impl IntegerSolver for Canned {
        fn solve(&self, _problem: &LpProblem) -> Solution {
            self.0.clone()
        }
    }

    fn scenario_a() -> ProductionProblem {
        build_problem(
            &[
                Item::new("duck", 5.0, 2.0, 400.0, 150.0),
                Item::new("fish", 4.0, 3.0, 300.0, 50.0),
            ],
            400.0,
        )
        .unwrap()
    }

    #[test]
    fn test_solve_scenario_a() {
        let problem = scenario_a();
        let solution = solve_plan(&problem, &BranchAndBound::new());

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.quantity("duck"), Some(150));
        assert_eq!(solution.quantity("fish"), Some(33));
        assert!((solution.objective_value - 882.0).abs() < 1e-9);
        assert!(solution.binding_constraints.contains(&"duck_forecast".to_string()));
        assert!(problem.is_feasible(&solution.values()));
    }

    #[test]
    fn test_problem_is_reusable_after_solving() {
        let problem = scenario_a();
        let before = format!("{:?}", problem.lp());
        let first = solve_plan(&problem, &BranchAndBound::new());
        let second = solve_plan(&problem, &BranchAndBound::new());
        assert_eq!(format!("{:?}", problem.lp()), before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_optimal_status_is_surfaced() {
        let problem = scenario_a();
        for status in [SolutionStatus::Infeasible, SolutionStatus::Unbounded] {
            let mut canned = Solution::infeasible();
            canned.status = status;
            let solution = solve_plan(&problem, &Canned(canned));
            assert_eq!(solution.status, status);
            assert!(solution.quantities.is_empty());
            assert!(matches!(
                solution.ensure_optimal(),
                Err(SolverError::NotOptimal { status: s, .. }) if s == status
            ));
        }
    }

    #[test]
    fn test_error_message_is_kept() {
        let problem = scenario_a();
        let solution = solve_plan(&problem, &Canned(Solution::error("time limit of 1ms reached")));
        let err = solution.ensure_optimal().unwrap_err();
        assert_eq!(err.to_string(), "Solver finished with status ERROR: time limit of 1ms reached");
    }

    #[test]
    fn test_infeasible_optimal_is_downgraded() {
        let problem = scenario_a();
        let bogus = Solution::optimal(problem.lp(), vec![400.0, 0.0], 1e-9);
        let solution = solve_plan(&problem, &Canned(bogus));
        assert_eq!(solution.status, SolutionStatus::Error);
        assert!(solution.message.unwrap().contains("resource_budget"));
    }

    #[test]
    fn test_budget_just_below_one_unit() {
        let problem = build_problem(
            &[
                Item::new("duck", 1.0, 1000.0, 10.0, 10.0),
                Item::new("fish", 0.0, 1.0, 0.0, 0.0),
            ],
            999.9995,
        )
        .unwrap();
        let solution = solve_plan(&problem, &BranchAndBound::new());

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values(), vec![0, 0]);
        assert_eq!(solution.objective_value, 0.0);
    }

    #[test]
    fn test_wrong_value_count_is_error() {
        let problem = scenario_a();
        let mut bogus = Solution::optimal(problem.lp(), vec![1.0, 1.0], 1e-9);
        bogus.values.pop();
        let solution = solve_plan(&problem, &Canned(bogus));
        assert_eq!(solution.status, SolutionStatus::Error);
    }
}
