//! Run configuration.
//!
//! All tunables of a planning run live here instead of in constants. Every
//! field has a default, so a config file only needs the values it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use feedmix_chart::ChartOptions;
use feedmix_solver::{BranchAndBound, Solver};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::item::Item;
use crate::sheet::{InputReadError, Parameters};

/// Upper bounds for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCaps {
    pub name: String,
    /// Production-time limit
    pub capacity_cap: f64,
    /// Sales forecast limit
    pub forecast_cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub max_nodes: usize,
    /// Wall-clock limit for the integer search, unlimited when absent
    pub time_limit_ms: Option<u64>,
    pub tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_nodes: 100_000,
            time_limit_ms: Some(10_000),
            tolerance: 1e-9,
        }
    }
}

impl SolverSettings {
    pub fn branch_and_bound(&self) -> BranchAndBound {
        let solver = BranchAndBound::new()
            .with_lp_solver(Solver::new().with_tolerance(self.tolerance))
            .with_max_nodes(self.max_nodes);
        match self.time_limit_ms {
            Some(ms) => solver.with_time_limit(Duration::from_millis(ms)),
            None => solver,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Parameter sheet
    pub input_path: PathBuf,
    /// Chart image
    pub output_path: PathBuf,
    /// Optional copy of the printed report
    pub report_path: Option<PathBuf>,
    /// Overrides the sheet's resource_budget when set
    pub resource_budget: Option<f64>,
    /// Caps joined to sheet items by name
    pub items: Vec<ItemCaps>,
    pub solver: SolverSettings,
    pub chart: ChartOptions,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/bathing_friends_unlimited.csv"),
            output_path: PathBuf::from("report/figures/result_plot.png"),
            report_path: None,
            resource_budget: None,
            items: vec![
                ItemCaps {
                    name: "duck".to_string(),
                    capacity_cap: 400.0,
                    forecast_cap: 150.0,
                },
                ItemCaps {
                    name: "fish".to_string(),
                    capacity_cap: 300.0,
                    forecast_cap: 50.0,
                },
            ],
            solver: SolverSettings::default(),
            chart: ChartOptions::default(),
        }
    }
}

impl PlanConfig {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputReadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| InputReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source).map_err(|source| InputReadError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn caps_for(&self, name: &str) -> Option<&ItemCaps> {
        self.items.iter().find(|caps| caps.name == name)
    }

    /// Budget to plan against: the configured override, else the sheet's value
    pub fn resource_budget(&self, parameters: &Parameters) -> f64 {
        self.resource_budget.unwrap_or(parameters.resource_budget)
    }

    /// Join sheet items with their configured caps, keeping sheet order
    pub fn items(&self, parameters: &Parameters) -> Result<Vec<Item>, InputReadError> {
        for caps in &self.items {
            if !parameters.items.iter().any(|p| p.name == caps.name) {
                warn!(item = %caps.name, "caps configured for an item the sheet does not declare");
            }
        }

        parameters
            .items
            .iter()
            .map(|p| {
                let caps = self
                    .caps_for(&p.name)
                    .ok_or_else(|| InputReadError::MissingCaps(p.name.clone()))?;
                Ok(Item {
                    name: p.name.clone(),
                    unit_profit: p.unit_profit,
                    resource_rate: p.resource_rate,
                    capacity_cap: caps.capacity_cap,
                    forecast_cap: caps.forecast_cap,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::ItemParameters;

    fn parameters() -> Parameters {
        Parameters {
            resource_budget: 400.0,
            items: vec![
                ItemParameters {
                    name: "duck".to_string(),
                    unit_profit: 5.0,
                    resource_rate: 2.0,
                },
                ItemParameters {
                    name: "fish".to_string(),
                    unit_profit: 4.0,
                    resource_rate: 3.0,
                },
            ],
        }
    }

    #[test]
    fn test_defaults() {
        let config = PlanConfig::default();
        assert_eq!(config.caps_for("duck").unwrap().capacity_cap, 400.0);
        assert_eq!(config.caps_for("duck").unwrap().forecast_cap, 150.0);
        assert_eq!(config.caps_for("fish").unwrap().capacity_cap, 300.0);
        assert_eq!(config.caps_for("fish").unwrap().forecast_cap, 50.0);
        assert_eq!(config.chart.profit_tick, 150.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlanConfig::from_json(r#"{ "resource_budget": 250, "solver": { "max_nodes": 10 } }"#).unwrap();
        assert_eq!(config.resource_budget, Some(250.0));
        assert_eq!(config.solver.max_nodes, 10);
        assert_eq!(config.solver.time_limit_ms, Some(10_000));
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.output_path, PathBuf::from("report/figures/result_plot.png"));
    }

    #[test]
    fn test_json_round_trip() {
        let config = PlanConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert_eq!(PlanConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_join_items_in_sheet_order() {
        let mut config = PlanConfig::default();
        config.items.reverse();
        let items = config.items(&parameters()).unwrap();
        assert_eq!(items[0].name, "duck");
        assert_eq!(items[0].capacity_cap, 400.0);
        assert_eq!(items[1].name, "fish");
        assert_eq!(items[1].forecast_cap, 50.0);
        assert_eq!(items[1].unit_profit, 4.0);
    }

    #[test]
    fn test_missing_caps() {
        let mut config = PlanConfig::default();
        config.items.retain(|caps| caps.name != "fish");
        let err = config.items(&parameters()).unwrap_err();
        assert!(matches!(err, InputReadError::MissingCaps(ref name) if name == "fish"));
    }

    #[test]
    fn test_budget_override() {
        let mut config = PlanConfig::default();
        assert_eq!(config.resource_budget(&parameters()), 400.0);
        config.resource_budget = Some(0.0);
        assert_eq!(config.resource_budget(&parameters()), 0.0);
    }

    #[test]
    fn test_invalid_json_file() {
        let path = std::env::temp_dir().join(format!("feedmix-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = PlanConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, InputReadError::Config { .. }));
    }
}
