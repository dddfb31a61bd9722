//! Profit vs total amount chart for a production plan.
//!
//! Every integer combination of item quantities up to the caps is plotted
//! as a dot (profit on x, total amount on y). Dashed lines cross at the
//! optimal plan. With a font configured, the chart also gets a title, axis
//! labels, tick values and a legend.

mod canvas;
mod grid;
mod labels;

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;

use canvas::{Canvas, BLUE, GREY, ORANGE, RED};
pub use grid::{GridPoint, GridPoints, TradeOffGrid};
use labels::Labels;

const MARGIN: u32 = 40;

#[derive(Error, Debug)]
pub enum ChartError {
    /// `points` is `None` when the count does not fit in a `u64`
    #[error("Trade-off grid has {} points, more than the limit of {limit}", point_count(.points))]
    GridTooLarge { points: Option<u64>, limit: u64 },
    #[error("Chart needs at least one item")]
    NoItems,
    #[error("Chart size {width}x{height} leaves no room for the plot")]
    TooSmall { width: u32, height: u32 },
    #[error("Cannot read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} is not a TrueType font")]
    InvalidFont(PathBuf),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

fn point_count(points: &Option<u64>) -> String {
    points.map_or_else(|| "more than u64::MAX".to_string(), |n| n.to_string())
}

/// Per-item chart inputs
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChartItem {
    pub name: String,
    pub capacity_cap: f64,
    pub forecast_cap: f64,
    pub unit_profit: f64,
    pub resource_rate: f64,
    /// Quantity in the optimal plan
    pub optimal: u64,
}

impl ChartItem {
    /// Largest integer quantity allowed by both caps
    pub fn upper_bound(&self) -> u64 {
        let cap = self.capacity_cap.min(self.forecast_cap);
        if cap > 0.0 { cap.floor() as u64 } else { 0 }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInput {
    pub items: Vec<ChartItem>,
    pub resource_budget: f64,
}

impl ChartInput {
    pub fn optimal_profit(&self) -> f64 {
        self.items.iter().map(|i| i.unit_profit * i.optimal as f64).sum()
    }

    pub fn optimal_total(&self) -> u64 {
        self.items.iter().map(|i| i.optimal).sum()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    /// Spacing of x axis ticks in profit units
    pub profit_tick: f64,
    /// Refuse to enumerate grids larger than this
    pub max_grid_points: u64,
    /// TrueType font for the title, labels and legend; no text without one
    pub font_path: Option<PathBuf>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            profit_tick: 150.0,
            max_grid_points: 2_000_000,
            font_path: None,
        }
    }
}

/// Draw the trade-off chart
pub fn render(input: &ChartInput, options: &ChartOptions) -> Result<RgbImage, ChartError> {
    if input.items.is_empty() {
        return Err(ChartError::NoItems);
    }
    if options.width <= 2 * MARGIN || options.height <= 2 * MARGIN {
        return Err(ChartError::TooSmall {
            width: options.width,
            height: options.height,
        });
    }

    let grid = TradeOffGrid::new(&input.items);
    match grid.len() {
        Some(n) if n <= options.max_grid_points => {}
        n => {
            return Err(ChartError::GridTooLarge {
                points: n,
                limit: options.max_grid_points,
            });
        }
    }

    let labels = options.font_path.as_deref().map(Labels::load).transpose()?;

    let max_profit = input
        .items
        .iter()
        .map(|i| i.unit_profit * i.upper_bound() as f64)
        .sum::<f64>();
    let max_total = input.items.iter().map(ChartItem::upper_bound).sum::<u64>();

    let mut canvas = Canvas::new(options.width, options.height, MARGIN, max_profit, max_total as f64);
    canvas.axes();
    let ticks = canvas.x_ticks(options.profit_tick);

    // Over-budget points first so feasible ones stay on top
    for over_budget in [true, false] {
        for point in grid.points() {
            if (point.resource_used > input.resource_budget + 1e-9) == over_budget {
                let color = if over_budget { GREY } else { BLUE };
                canvas.dot(point.profit, point.total_amount as f64, color);
            }
        }
    }

    let best_profit = input.optimal_profit();
    let best_total = input.optimal_total() as f64;
    canvas.dashed_hline(best_total, ORANGE);
    canvas.dashed_vline(best_profit, RED);
    canvas.marker(best_profit, best_total, RED);

    if let Some(labels) = &labels {
        labels.draw(&mut canvas, &ticks);
    }

    Ok(canvas.into_image())
}

/// Render the chart and write it as an image, format chosen from the path extension
pub fn save(input: &ChartInput, options: &ChartOptions, path: impl AsRef<Path>) -> Result<(), ChartError> {
    let img = render(input, options)?;
    img.save(path)?;
    Ok(())
}
