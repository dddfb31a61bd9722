use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::lexer::{Lexer, TokenKind};

pub const ITEM_LABEL: &str = "item";
pub const BUDGET_LABEL: &str = "resource_budget";
pub const UNIT_PROFIT_FIELD: &str = "unit_profit";
pub const RESOURCE_RATE_FIELD: &str = "resource_rate";

#[derive(Error, Debug)]
pub enum InputReadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Line {line}: unterminated quoted cell {text}")]
    UnterminatedQuote { line: usize, text: String },
    #[error("Line {line}: unexpected text '{text}' after a quoted cell")]
    TextAfterQuote { line: usize, text: String },
    #[error("Line {line}: '{label}' has no value")]
    MissingValue { line: usize, label: String },
    #[error("Line {line}: '{label}' expects a number, found '{text}'")]
    InvalidNumber {
        line: usize,
        label: String,
        text: String,
    },
    #[error("Line {line}: item '{name}' is declared twice")]
    DuplicateItem { line: usize, name: String },
    #[error("Line {line}: '{label}' is given twice")]
    DuplicateField { line: usize, label: String },
    #[error("Line {line}: '{label}' refers to undeclared item '{item}'")]
    UnknownItem {
        line: usize,
        label: String,
        item: String,
    },
    #[error("Sheet has no resource_budget row")]
    MissingBudget,
    #[error("Item '{item}' has no {field} row")]
    MissingItemField { item: String, field: &'static str },
    #[error("Sheet declares no items")]
    NoItems,
    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("No capacity/forecast caps configured for item '{0}'")]
    MissingCaps(String),
}

/// Business inputs for one item, as read from the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemParameters {
    pub name: String,
    pub unit_profit: f64,
    pub resource_rate: f64,
}

/// Everything the sheet supplies to the model builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub resource_budget: f64,
    pub items: Vec<ItemParameters>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based source line
    pub line: usize,
    pub cells: Vec<String>,
}

impl Row {
    pub fn label(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or("")
    }

    /// First value cell, if present and not blank
    pub fn value(&self) -> Option<&str> {
        self.cells.get(1).map(String::as_str).filter(|v| !v.is_empty())
    }

    fn require_value(&self) -> Result<&str, InputReadError> {
        self.value().ok_or_else(|| InputReadError::MissingValue {
            line: self.line,
            label: self.label().to_string(),
        })
    }

    fn number(&self) -> Result<f64, InputReadError> {
        let text = self.require_value()?;
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| InputReadError::InvalidNumber {
                line: self.line,
                label: self.label().to_string(),
                text: text.to_string(),
            })
    }
}

/// A delimited sheet split into labelled rows
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn parse(source: &str) -> Result<Self, InputReadError> {
        let mut rows = Vec::new();
        let mut cells: Vec<String> = Vec::new();
        let mut pending: Option<String> = None;
        let mut line = 1;

        for token in Lexer::tokenize(source) {
            match token.kind {
                TokenKind::Cell | TokenKind::Quoted => {
                    if pending.is_some() {
                        return Err(InputReadError::TextAfterQuote { line, text: token.text });
                    }
                    pending = Some(token.text);
                }
                TokenKind::Separator => cells.push(pending.take().unwrap_or_default()),
                TokenKind::Comment => {}
                TokenKind::Error => {
                    return Err(InputReadError::UnterminatedQuote { line, text: token.text });
                }
                TokenKind::Newline | TokenKind::Eof => {
                    if let Some(cell) = pending.take() {
                        cells.push(cell);
                    }
                    if cells.iter().any(|c| !c.is_empty()) {
                        rows.push(Row {
                            line,
                            cells: std::mem::take(&mut cells),
                        });
                    } else {
                        cells.clear();
                    }
                    line += 1;
                }
            }
        }

        Ok(Self { rows })
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, InputReadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| InputReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Extract parameters by field name. Rows with other labels are ignored.
    pub fn parameters(&self) -> Result<Parameters, InputReadError> {
        // Declarations first so field rows may come in any order
        let mut names: Vec<String> = Vec::new();
        for row in &self.rows {
            if row.label().eq_ignore_ascii_case(ITEM_LABEL) {
                let name = row.require_value()?;
                if names.iter().any(|n| n == name) {
                    return Err(InputReadError::DuplicateItem {
                        line: row.line,
                        name: name.to_string(),
                    });
                }
                names.push(name.to_string());
            }
        }

        let mut budget: Option<f64> = None;
        let mut fields: HashMap<(String, &'static str), f64> = HashMap::new();

        for row in &self.rows {
            let label = row.label();
            if label.eq_ignore_ascii_case(ITEM_LABEL) {
                continue;
            }

            if label.eq_ignore_ascii_case(BUDGET_LABEL) {
                if budget.is_some() {
                    return Err(InputReadError::DuplicateField {
                        line: row.line,
                        label: label.to_string(),
                    });
                }
                budget = Some(row.number()?);
                continue;
            }

            let Some((item, field)) = split_field(label) else {
                debug!(line = row.line, label, "ignoring sheet row");
                continue;
            };
            if !names.iter().any(|n| n == item) {
                return Err(InputReadError::UnknownItem {
                    line: row.line,
                    label: label.to_string(),
                    item: item.to_string(),
                });
            }
            let value = row.number()?;
            if fields.insert((item.to_string(), field), value).is_some() {
                return Err(InputReadError::DuplicateField {
                    line: row.line,
                    label: label.to_string(),
                });
            }
        }

        if names.is_empty() {
            return Err(InputReadError::NoItems);
        }
        let resource_budget = budget.ok_or(InputReadError::MissingBudget)?;

        let mut items = Vec::with_capacity(names.len());
        for name in names {
            let mut get = |field: &'static str| {
                fields
                    .remove(&(name.clone(), field))
                    .ok_or_else(|| InputReadError::MissingItemField {
                        item: name.clone(),
                        field,
                    })
            };
            let unit_profit = get(UNIT_PROFIT_FIELD)?;
            let resource_rate = get(RESOURCE_RATE_FIELD)?;
            items.push(ItemParameters {
                name,
                unit_profit,
                resource_rate,
            });
        }

        Ok(Parameters {
            resource_budget,
            items,
        })
    }
}

impl Parameters {
    pub fn parse(source: &str) -> Result<Self, InputReadError> {
        Sheet::parse(source)?.parameters()
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, InputReadError> {
        Sheet::read(path)?.parameters()
    }
}

/// Split `<item>.<field>` for the fields the planner reads
fn split_field(label: &str) -> Option<(&str, &'static str)> {
    let (item, field) = label.rsplit_once('.')?;
    let field = [UNIT_PROFIT_FIELD, RESOURCE_RATE_FIELD]
        .into_iter()
        .find(|known| field.eq_ignore_ascii_case(known))?;
    (!item.is_empty()).then_some((item, field))
}
