use std::time::{Duration, Instant};

use tracing::debug;

use crate::problem::{ConstraintOp, LpProblem};
use crate::simplex::Solver;
use crate::solution::{Solution, SolutionStatus};

/// Branch-and-bound search over the LP relaxation for problems with integer variables
#[derive(Debug, Clone)]
pub struct BranchAndBound {
    /// Solver for each node's relaxation
    lp: Solver,
    /// Maximum number of nodes to explore
    max_nodes: usize,
    /// Wall-clock budget for the whole search
    time_limit: Option<Duration>,
    /// Distance from an integer still treated as integral
    integrality_tolerance: f64,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self {
            lp: Solver::default(),
            max_nodes: 100_000,
            time_limit: None,
            integrality_tolerance: 1e-6,
        }
    }
}

/// Extra bound a node adds on top of the root problem
#[derive(Debug, Clone, Copy)]
struct Bound {
    variable: usize,
    op: ConstraintOp,
    value: f64,
}

#[derive(Debug, Clone, Default)]
struct Node {
    bounds: Vec<Bound>,
}

impl Node {
    fn child(&self, bound: Bound) -> Node {
        let mut bounds = self.bounds.clone();
        bounds.push(bound);
        Node { bounds }
    }

    fn relaxation(&self, root: &LpProblem) -> LpProblem {
        let mut problem = root.clone();
        for bound in &self.bounds {
            let mut coefficients = vec![0.0; root.num_variables()];
            coefficients[bound.variable] = 1.0;
            let suffix = match bound.op {
                ConstraintOp::Le => "le",
                ConstraintOp::Ge => "ge",
                ConstraintOp::Eq => "eq",
            };
            problem.add_constraint(
                format!("branch_{}_{}", root.variables[bound.variable], suffix),
                coefficients,
                bound.op,
                bound.value,
            );
        }
        problem
    }
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lp_solver(mut self, lp: Solver) -> Self {
        self.lp = lp;
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }

    /// Tolerance used when checking the returned point against the constraints
    pub fn feasibility_tolerance(&self) -> f64 {
        self.lp.tolerance().max(self.integrality_tolerance)
    }

    /// Solve the problem, honoring integrality flags.
    ///
    /// Nodes are explored depth first, floor branch before ceiling branch, so
    /// the result is deterministic for a given problem.
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        if !problem.has_integer_variables() {
            return self.lp.solve(problem);
        }
        if let Err(e) = problem.validate() {
            return Solution::error(e.to_string());
        }

        let started = Instant::now();
        // Search maximizes sense * objective
        let sense = if problem.objective.minimize { -1.0 } else { 1.0 };
        let prune_tolerance = self.feasibility_tolerance();

        let mut incumbent: Option<(Vec<f64>, f64)> = None;
        let mut stack = vec![Node::default()];
        let mut explored = 0usize;

        while let Some(node) = stack.pop() {
            if explored >= self.max_nodes {
                return Solution::error(format!("node limit of {} reached", self.max_nodes));
            }
            if let Some(limit) = self.time_limit {
                if started.elapsed() >= limit {
                    return Solution::error(format!("time limit of {:?} reached", limit));
                }
            }
            explored += 1;

            let relaxed = self.lp.solve(&node.relaxation(problem));
            match relaxed.status {
                SolutionStatus::Optimal => {}
                SolutionStatus::Infeasible => continue,
                SolutionStatus::Unbounded => return Solution::unbounded(),
                SolutionStatus::Error => return relaxed,
            }

            let bound = sense * relaxed.objective_value;
            if let Some((_, best)) = &incumbent {
                if bound <= best + prune_tolerance {
                    continue;
                }
            }

            let branch_on = match self.branching_variable(problem, &relaxed.values) {
                Some(choice) => Some(choice),
                None => {
                    let values = self.round_integers(problem, relaxed.values.clone());
                    if problem.violations(&values, prune_tolerance).is_empty() {
                        let value = sense * problem.objective_value(&values);
                        debug!(node = explored, objective = sense * value, "new incumbent");
                        incumbent = Some((values, value));
                        None
                    } else {
                        // Rounding a nearly integral value broke a row, split on it instead
                        let choice = self.rounded_variable(problem, &relaxed.values);
                        if choice.is_none() {
                            debug!(node = explored, "relaxation point violates its own rows, dropping node");
                        }
                        choice
                    }
                }
            };

            if let Some((variable, value)) = branch_on {
                // Pushed last, explored first
                stack.push(node.child(Bound {
                    variable,
                    op: ConstraintOp::Ge,
                    value: value.ceil(),
                }));
                stack.push(node.child(Bound {
                    variable,
                    op: ConstraintOp::Le,
                    value: value.floor(),
                }));
            }
        }

        debug!(nodes = explored, "branch-and-bound finished");

        match incumbent {
            Some((values, _)) => Solution::optimal(problem, values, prune_tolerance),
            None => Solution::infeasible(),
        }
    }

    /// The most fractional integer variable, lowest index on ties
    fn branching_variable(&self, problem: &LpProblem, values: &[f64]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64, f64)> = None;
        for (j, &value) in values.iter().enumerate() {
            if !problem.is_integer(j) {
                continue;
            }
            let fraction = (value - value.round()).abs();
            if fraction <= self.integrality_tolerance {
                continue;
            }
            if best.is_none_or(|(_, _, f)| fraction > f) {
                best = Some((j, value, fraction));
            }
        }
        best.map(|(j, value, _)| (j, value))
    }

    /// The integer variable moved furthest by rounding, lowest index on ties
    fn rounded_variable(&self, problem: &LpProblem, values: &[f64]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64, f64)> = None;
        for (j, &value) in values.iter().enumerate() {
            if !problem.is_integer(j) {
                continue;
            }
            let shift = (value - value.round()).abs();
            if shift > 0.0 && best.is_none_or(|(_, _, s)| shift > s) {
                best = Some((j, value, shift));
            }
        }
        best.map(|(j, value, _)| (j, value))
    }

    fn round_integers(&self, problem: &LpProblem, mut values: Vec<f64>) -> Vec<f64> {
        for (j, value) in values.iter_mut().enumerate() {
            if problem.is_integer(j) {
                *value = value.round();
            }
        }
        values
    }
}
