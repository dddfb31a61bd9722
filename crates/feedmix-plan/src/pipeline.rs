use std::path::{Path, PathBuf};

use feedmix_chart::{ChartError, ChartInput, ChartItem};
use thiserror::Error;
use tracing::info;

use crate::adapter::{solve_plan, PlanSolution, SolverError};
use crate::builder::{ModelBuilder, ModelDefinitionError};
use crate::config::PlanConfig;
use crate::extract::{extract, Report, ResultExtractionError};
use crate::item::ProductionProblem;
use crate::sheet::{InputReadError, Parameters};

#[derive(Error, Debug)]
pub enum OutputWriteError {
    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot write chart {path}: {source}")]
    Chart { path: PathBuf, source: ChartError },
    #[error("Cannot write report {path}: {source}")]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Any failure of a planning run, tagged with the stage that failed
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input error: {0}")]
    InputRead(#[from] InputReadError),
    #[error("Model error: {0}")]
    ModelDefinition(#[from] ModelDefinitionError),
    #[error("{0}")]
    Solver(#[from] SolverError),
    #[error("Extraction error: {0}")]
    ResultExtraction(#[from] ResultExtractionError),
    #[error("Output error: {0}")]
    OutputWrite(#[from] OutputWriteError),
}

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct Outcome {
    pub problem: ProductionProblem,
    pub solution: PlanSolution,
    pub report: Report,
}

impl Outcome {
    /// Data the chart needs, per item in item order
    pub fn chart_input(&self) -> ChartInput {
        ChartInput {
            items: self
                .problem
                .items()
                .iter()
                .zip(self.solution.values())
                .map(|(item, optimal)| ChartItem {
                    name: item.name.clone(),
                    capacity_cap: item.capacity_cap,
                    forecast_cap: item.forecast_cap,
                    unit_profit: item.unit_profit,
                    resource_rate: item.resource_rate,
                    optimal,
                })
                .collect(),
            resource_budget: self.problem.resource_budget(),
        }
    }

    /// Resource consumed by the optimal plan
    pub fn resource_used(&self) -> f64 {
        self.problem.resource_used(&self.solution.values())
    }
}

/// Parameter sheet -> model -> solve -> report -> chart, driven by one config
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PlanConfig,
}

impl Pipeline {
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn load_parameters(&self) -> Result<Parameters, PipelineError> {
        info!(path = %self.config.input_path.display(), "reading parameter sheet");
        Ok(Parameters::read(&self.config.input_path)?)
    }

    /// Join sheet parameters with configured caps and build the model
    pub fn build(&self, parameters: &Parameters) -> Result<ProductionProblem, PipelineError> {
        let items = self.config.items(parameters)?;
        let problem = ModelBuilder::new(self.config.resource_budget(parameters))
            .items(items)
            .build()?;
        Ok(problem)
    }

    /// Build, solve and extract without touching the filesystem
    pub fn plan(&self, parameters: &Parameters) -> Result<Outcome, PipelineError> {
        let problem = self.build(parameters)?;

        let solver = self.config.solver.branch_and_bound();
        let solution = solve_plan(&problem, &solver);
        solution.ensure_optimal()?;

        let report = extract(&solution)?;
        info!(objective = report.objective_value, "found optimal plan");

        Ok(Outcome {
            problem,
            solution,
            report,
        })
    }

    /// Full run: read the sheet, plan, then write the chart and the optional report file
    pub fn run(&self) -> Result<Outcome, PipelineError> {
        let parameters = self.load_parameters()?;
        let outcome = self.plan(&parameters)?;
        self.write_outputs(&outcome)?;
        Ok(outcome)
    }

    pub fn write_outputs(&self, outcome: &Outcome) -> Result<(), OutputWriteError> {
        // Render before writing anything so a chart failure leaves no partial output
        let chart_path = &self.config.output_path;
        let image = feedmix_chart::render(&outcome.chart_input(), &self.config.chart).map_err(|source| {
            OutputWriteError::Chart {
                path: chart_path.clone(),
                source,
            }
        })?;

        create_parent_dir(chart_path)?;
        image.save(chart_path).map_err(|e| OutputWriteError::Chart {
            path: chart_path.clone(),
            source: e.into(),
        })?;
        info!(path = %chart_path.display(), "wrote chart");

        if let Some(report_path) = &self.config.report_path {
            create_parent_dir(report_path)?;
            std::fs::write(report_path, outcome.report.to_string()).map_err(|source| {
                OutputWriteError::Report {
                    path: report_path.clone(),
                    source,
                }
            })?;
            info!(path = %report_path.display(), "wrote report");
        }

        Ok(())
    }
}

fn create_parent_dir(path: &Path) -> Result<(), OutputWriteError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| OutputWriteError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
