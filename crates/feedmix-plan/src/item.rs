use feedmix_solver::LpProblem;
use serde::{Deserialize, Serialize};

/// One product competing for the shared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier, also the LP variable name
    pub name: String,
    /// Profit per unit produced
    pub unit_profit: f64,
    /// Resource consumed per unit produced
    pub resource_rate: f64,
    /// Production-time limit
    pub capacity_cap: f64,
    /// Demand limit
    pub forecast_cap: f64,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        unit_profit: f64,
        resource_rate: f64,
        capacity_cap: f64,
        forecast_cap: f64,
    ) -> Self {
        Self {
            name: name.into(),
            unit_profit,
            resource_rate,
            capacity_cap,
            forecast_cap,
        }
    }

    /// The tighter of the two caps
    pub fn upper_bound(&self) -> f64 {
        self.capacity_cap.min(self.forecast_cap)
    }
}

/// A validated planning model. Built once by [`crate::ModelBuilder`] and
/// never modified; solving returns a separate [`crate::PlanSolution`].
#[derive(Debug, Clone)]
pub struct ProductionProblem {
    pub(crate) items: Vec<Item>,
    pub(crate) resource_budget: f64,
    pub(crate) lp: LpProblem,
}

impl ProductionProblem {
    /// Items in variable order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn resource_budget(&self) -> f64 {
        self.resource_budget
    }

    /// The integer program handed to the solver
    pub fn lp(&self) -> &LpProblem {
        &self.lp
    }

    /// Resource consumed by `quantities`, given in item order
    pub fn resource_used(&self, quantities: &[u64]) -> f64 {
        self.items
            .iter()
            .zip(quantities)
            .map(|(item, &q)| item.resource_rate * q as f64)
            .sum()
    }

    /// Profit of `quantities`, given in item order
    pub fn profit(&self, quantities: &[u64]) -> f64 {
        self.items
            .iter()
            .zip(quantities)
            .map(|(item, &q)| item.unit_profit * q as f64)
            .sum()
    }

    /// Whether `quantities` respects the budget and every cap
    pub fn is_feasible(&self, quantities: &[u64]) -> bool {
        quantities.len() == self.items.len()
            && self.resource_used(quantities) <= self.resource_budget + 1e-9
            && self
                .items
                .iter()
                .zip(quantities)
                .all(|(item, &q)| q as f64 <= item.upper_bound() + 1e-9)
    }
}
