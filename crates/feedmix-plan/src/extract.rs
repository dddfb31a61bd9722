use std::fmt;

use feedmix_solver::SolutionStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapter::PlanSolution;

pub const REPORT_HEADER: &str = "The optimal answer";
pub const SEPARATOR_WIDTH: usize = 70;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResultExtractionError {
    #[error("Cannot extract results from a solution with status {0}")]
    NotOptimal(SolutionStatus),
}

/// A positive quantity in the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub name: String,
    pub quantity: u64,
}

/// What gets reported for an optimal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Items with quantity > 0, in item order
    pub allocations: Vec<Allocation>,
    pub objective_value: f64,
}

/// Keep the positive quantities of an optimal solution, in item order
pub fn extract(solution: &PlanSolution) -> Result<Report, ResultExtractionError> {
    if !solution.is_optimal() {
        return Err(ResultExtractionError::NotOptimal(solution.status));
    }

    let allocations = solution
        .quantities
        .iter()
        .filter(|q| q.quantity > 0)
        .map(|q| Allocation {
            name: q.name.clone(),
            quantity: q.quantity,
        })
        .collect();

    Ok(Report {
        allocations,
        objective_value: solution.objective_value,
    })
}

impl Report {
    pub fn quantity(&self, name: &str) -> u64 {
        self.allocations
            .iter()
            .find(|a| a.name == name)
            .map_or(0, |a| a.quantity)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", REPORT_HEADER)?;
        writeln!(f, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        for allocation in &self.allocations {
            writeln!(f, "{} = {}", allocation.name, allocation.quantity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Quantity;

    fn solution(quantities: &[(&str, u64)], objective_value: f64) -> PlanSolution {
        PlanSolution {
            status: SolutionStatus::Optimal,
            quantities: quantities
                .iter()
                .map(|&(name, quantity)| Quantity {
                    name: name.to_string(),
                    quantity,
                })
                .collect(),
            objective_value,
            binding_constraints: Vec::new(),
            message: None,
        }
    }

    #[test]
    fn test_drops_zero_quantities_and_keeps_order() {
        let report = extract(&solution(&[("fish", 7), ("goose", 0), ("duck", 3)], 43.0)).unwrap();
        let names: Vec<_> = report.allocations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["fish", "duck"]);
        assert_eq!(report.objective_value, 43.0);
        assert_eq!(report.quantity("goose"), 0);
        assert_eq!(report.quantity("duck"), 3);
    }

    #[test]
    fn test_all_zero_plan_has_empty_report() {
        let report = extract(&solution(&[("duck", 0), ("fish", 0)], 0.0)).unwrap();
        assert!(report.allocations.is_empty());
        assert_eq!(report.objective_value, 0.0);
    }

    #[test]
    fn test_non_optimal_is_error() {
        for status in [SolutionStatus::Infeasible, SolutionStatus::Unbounded, SolutionStatus::Error] {
            let mut s = solution(&[], 0.0);
            s.status = status;
            assert_eq!(extract(&s), Err(ResultExtractionError::NotOptimal(status)));
        }
    }

    #[test]
    fn test_report_format() {
        let report = extract(&solution(&[("duck", 150), ("fish", 33)], 882.0)).unwrap();
        let text = report.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "The optimal answer");
        assert_eq!(lines[1], "-".repeat(70));
        assert_eq!(lines[2], "duck = 150");
        assert_eq!(lines[3], "fish = 33");
        assert_eq!(lines.len(), 4);
    }
}
