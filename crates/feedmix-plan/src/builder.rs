use std::collections::HashSet;
use std::fmt;

use feedmix_solver::{ConstraintOp, LpProblem};
use thiserror::Error;
use tracing::debug;

use crate::item::{Item, ProductionProblem};

pub const BUDGET_CONSTRAINT: &str = "resource_budget";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapKind {
    Capacity,
    Forecast,
}

impl fmt::Display for CapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapKind::Capacity => f.write_str("capacity_cap"),
            CapKind::Forecast => f.write_str("forecast_cap"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelDefinitionError {
    #[error("No items to plan")]
    NoItems,
    #[error("Item #{0} has an empty name")]
    EmptyName(usize),
    #[error("Item '{0}' appears more than once")]
    DuplicateItem(String),
    #[error("Resource budget must be non-negative, got {0}")]
    NegativeBudget(f64),
    #[error("Resource budget must be finite, got {0}")]
    NonFiniteBudget(f64),
    #[error("Item '{item}': {field} must be finite, got {value}")]
    NonFinite {
        item: String,
        field: &'static str,
        value: f64,
    },
    #[error("Item '{item}': resource_rate must be positive, got {value}")]
    NonPositiveRate { item: String, value: f64 },
    #[error("Item '{item}': {cap} must be non-negative, got {value}")]
    NegativeCap { item: String, cap: CapKind, value: f64 },
    #[error("Item '{item}': unit_profit must be non-negative, got {value}")]
    NegativeProfit { item: String, value: f64 },
}

/// Turns items and a shared budget into an integer program:
///
/// ```text
/// maximize   sum(unit_profit_i * x_i)
/// subject to sum(resource_rate_i * x_i) <= resource_budget
///            x_i <= capacity_cap_i
///            x_i <= forecast_cap_i
///            x_i >= 0, integer
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    items: Vec<Item>,
    resource_budget: f64,
}

impl ModelBuilder {
    pub fn new(resource_budget: f64) -> Self {
        Self {
            items: Vec::new(),
            resource_budget,
        }
    }

    pub fn item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn build(self) -> Result<ProductionProblem, ModelDefinitionError> {
        self.validate()?;

        let n = self.items.len();
        let names = self.items.iter().map(|item| item.name.clone()).collect();
        let mut lp = LpProblem::new(names);

        lp.set_objective(self.items.iter().map(|item| item.unit_profit).collect(), false);
        lp.add_constraint(
            BUDGET_CONSTRAINT,
            self.items.iter().map(|item| item.resource_rate).collect(),
            ConstraintOp::Le,
            self.resource_budget,
        );

        for (i, item) in self.items.iter().enumerate() {
            let mut unit = vec![0.0; n];
            unit[i] = 1.0;
            lp.add_constraint(cap_constraint(&item.name, CapKind::Capacity), unit.clone(), ConstraintOp::Le, item.capacity_cap);
            lp.add_constraint(cap_constraint(&item.name, CapKind::Forecast), unit, ConstraintOp::Le, item.forecast_cap);
            lp.set_integer(i);
        }

        debug!(
            items = n,
            constraints = lp.num_constraints(),
            resource_budget = self.resource_budget,
            "built production model"
        );

        Ok(ProductionProblem {
            items: self.items,
            resource_budget: self.resource_budget,
            lp,
        })
    }

    fn validate(&self) -> Result<(), ModelDefinitionError> {
        if self.items.is_empty() {
            return Err(ModelDefinitionError::NoItems);
        }
        if !self.resource_budget.is_finite() {
            return Err(ModelDefinitionError::NonFiniteBudget(self.resource_budget));
        }
        if self.resource_budget < 0.0 {
            return Err(ModelDefinitionError::NegativeBudget(self.resource_budget));
        }

        let mut seen = HashSet::new();
        for (i, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(ModelDefinitionError::EmptyName(i));
            }
            if !seen.insert(item.name.as_str()) {
                return Err(ModelDefinitionError::DuplicateItem(item.name.clone()));
            }

            for (field, value) in [
                ("unit_profit", item.unit_profit),
                ("resource_rate", item.resource_rate),
                ("capacity_cap", item.capacity_cap),
                ("forecast_cap", item.forecast_cap),
            ] {
                if !value.is_finite() {
                    return Err(ModelDefinitionError::NonFinite {
                        item: item.name.clone(),
                        field,
                        value,
                    });
                }
            }

            if item.resource_rate <= 0.0 {
                return Err(ModelDefinitionError::NonPositiveRate {
                    item: item.name.clone(),
                    value: item.resource_rate,
                });
            }
            for (cap, value) in [
                (CapKind::Capacity, item.capacity_cap),
                (CapKind::Forecast, item.forecast_cap),
            ] {
                if value < 0.0 {
                    return Err(ModelDefinitionError::NegativeCap {
                        item: item.name.clone(),
                        cap,
                        value,
                    });
                }
            }
            if item.unit_profit < 0.0 {
                return Err(ModelDefinitionError::NegativeProfit {
                    item: item.name.clone(),
                    value: item.unit_profit,
                });
            }
        }

        Ok(())
    }
}

/// Build the planning model for `items` sharing `resource_budget`
pub fn build_problem(items: &[Item], resource_budget: f64) -> Result<ProductionProblem, ModelDefinitionError> {
    ModelBuilder::new(resource_budget).items(items.iter().cloned()).build()
}

pub fn cap_constraint(item: &str, cap: CapKind) -> String {
    match cap {
        CapKind::Capacity => format!("{}_capacity", item),
        CapKind::Forecast => format!("{}_forecast", item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duck() -> Item {
        Item::new("duck", 5.0, 2.0, 400.0, 150.0)
    }

    fn fish() -> Item {
        Item::new("fish", 4.0, 3.0, 300.0, 50.0)
    }

    #[test]
    fn test_builds_shared_and_per_item_constraints() {
        let problem = build_problem(&[duck(), fish()], 400.0).unwrap();
        let lp = problem.lp();

        assert_eq!(lp.variables, vec!["duck", "fish"]);
        assert!(!lp.objective.minimize);
        assert_eq!(lp.objective.coefficients, vec![5.0, 4.0]);
        assert_eq!(lp.num_constraints(), 5);

        let budget = &lp.constraints[0];
        assert_eq!(budget.name, BUDGET_CONSTRAINT);
        assert_eq!(budget.coefficients, vec![2.0, 3.0]);
        assert_eq!(budget.op, ConstraintOp::Le);
        assert_eq!(budget.rhs, 400.0);

        let names: Vec<_> = lp.constraints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["resource_budget", "duck_capacity", "duck_forecast", "fish_capacity", "fish_forecast"]
        );
        assert_eq!(lp.constraints[4].coefficients, vec![0.0, 1.0]);
        assert_eq!(lp.constraints[4].rhs, 50.0);
        assert!(lp.is_integer(0) && lp.is_integer(1));
    }

    #[test]
    fn test_handles_any_item_count() {
        let items: Vec<_> = (0..5)
            .map(|i| Item::new(format!("feed{}", i), 1.0 + i as f64, 1.0, 10.0, 10.0))
            .collect();
        let problem = ModelBuilder::new(20.0).items(items).build().unwrap();
        assert_eq!(problem.items().len(), 5);
        assert_eq!(problem.lp().num_variables(), 5);
        assert_eq!(problem.lp().num_constraints(), 11);
    }

    #[test]
    fn test_rejects_zero_rate() {
        let mut item = duck();
        item.resource_rate = 0.0;
        let err = build_problem(&[item, fish()], 400.0).unwrap_err();
        assert_eq!(
            err,
            ModelDefinitionError::NonPositiveRate {
                item: "duck".to_string(),
                value: 0.0,
            }
        );
    }

    #[test]
    fn test_rejects_negative_cap() {
        let mut item = fish();
        item.forecast_cap = -1.0;
        let err = build_problem(&[duck(), item], 400.0).unwrap_err();
        assert_eq!(err.to_string(), "Item 'fish': forecast_cap must be non-negative, got -1");
    }

    #[test]
    fn test_rejects_negative_budget() {
        assert_eq!(
            build_problem(&[duck()], -5.0).unwrap_err(),
            ModelDefinitionError::NegativeBudget(-5.0)
        );
    }

    #[test]
    fn test_rejects_bad_items() {
        assert_eq!(build_problem(&[], 1.0).unwrap_err(), ModelDefinitionError::NoItems);
        assert_eq!(
            build_problem(&[duck(), duck()], 1.0).unwrap_err(),
            ModelDefinitionError::DuplicateItem("duck".to_string())
        );
        assert_eq!(
            build_problem(&[Item::new(" ", 1.0, 1.0, 1.0, 1.0)], 1.0).unwrap_err(),
            ModelDefinitionError::EmptyName(0)
        );
        assert!(matches!(
            build_problem(&[Item::new("x", f64::NAN, 1.0, 1.0, 1.0)], 1.0),
            Err(ModelDefinitionError::NonFinite { field: "unit_profit", .. })
        ));
        assert!(matches!(
            build_problem(&[Item::new("x", -1.0, 1.0, 1.0, 1.0)], 1.0),
            Err(ModelDefinitionError::NegativeProfit { .. })
        ));
    }

    #[test]
    fn test_zero_caps_are_valid() {
        let items = [Item::new("duck", 5.0, 2.0, 0.0, 0.0)];
        assert!(build_problem(&items, 0.0).is_ok());
    }
}
