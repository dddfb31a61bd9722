//! WASM bindings for feedmix
//!
//! Lets a web page plan from an in-memory parameter sheet. Nothing here
//! touches the filesystem; the chart is left to the caller.

use wasm_bindgen::prelude::*;

use crate::config::PlanConfig;
use crate::lexer::Lexer;
use crate::pipeline::Pipeline;
use crate::sheet::Parameters;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Plan from sheet text. An empty `config_json` uses the default config.
#[wasm_bindgen]
pub fn solve_sheet(sheet: &str, config_json: &str) -> Result<JsValue, JsValue> {
    let config = if config_json.trim().is_empty() {
        PlanConfig::default()
    } else {
        PlanConfig::from_json(config_json).map_err(js_error)?
    };

    let parameters = Parameters::parse(sheet).map_err(js_error)?;
    let outcome = Pipeline::new(config).plan(&parameters).map_err(js_error)?;

    let result = PlanResult {
        status: outcome.solution.status.to_string(),
        report: outcome.report.to_string(),
        objective_value: outcome.report.objective_value,
        resource_used: outcome.resource_used(),
        quantities: outcome.solution.quantities,
        binding_constraints: outcome.solution.binding_constraints,
    };
    serde_wasm_bindgen::to_value(&result).map_err(js_error)
}

/// Parse sheet text and return the parameters as JSON
#[wasm_bindgen]
pub fn parse_sheet(sheet: &str) -> Result<JsValue, JsValue> {
    let parameters = Parameters::parse(sheet).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&parameters).map_err(js_error)
}

/// Tokenize sheet text for highlighting
#[wasm_bindgen]
pub fn tokenize(sheet: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<TokenInfo> = Lexer::tokenize(sheet)
        .into_iter()
        .map(|t| TokenInfo {
            kind: format!("{:?}", t.kind),
            text: t.text,
            start: t.span.start,
            end: t.span.end,
        })
        .collect();
    serde_wasm_bindgen::to_value(&tokens).map_err(js_error)
}

/// The default config, as a starting point for editing
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&PlanConfig::default()).map_err(js_error)
}

#[derive(serde::Serialize)]
struct PlanResult {
    status: String,
    report: String,
    objective_value: f64,
    resource_used: f64,
    quantities: Vec<crate::adapter::Quantity>,
    binding_constraints: Vec<String>,
}

#[derive(serde::Serialize)]
struct TokenInfo {
    kind: String,
    text: String,
    start: usize,
    end: usize,
}
