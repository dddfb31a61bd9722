//! Title, axis labels, tick values and legend.
//!
//! Text needs a TrueType font, loaded from [`crate::ChartOptions::font_path`].
//! Charts rendered without one carry only the plot itself.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};

use crate::canvas::{Canvas, BLACK, BLUE, GREY, RED};
use crate::ChartError;

pub const TITLE: &str = "Profit vs total amount";
pub const X_LABEL: &str = "Profit";
pub const Y_LABEL: &str = "Total amount";

const LEGEND: [(&str, Rgb<u8>); 3] = [
    ("Within budget", BLUE),
    ("Over budget", GREY),
    ("Optimal plan", RED),
];

const TITLE_SIZE: f32 = 16.0;
const LABEL_SIZE: f32 = 12.0;
const TICK_SIZE: f32 = 10.0;
const SWATCH: u32 = 8;

pub struct Labels {
    font: Font<'static>,
}

impl Labels {
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let bytes = std::fs::read(path).map_err(|source| ChartError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| ChartError::InvalidFont(path.to_path_buf()))?;
        Ok(Self { font })
    }

    /// Draw into the margins around the plot. `ticks` pairs each x tick value
    /// with its pixel column.
    pub fn draw(&self, canvas: &mut Canvas, ticks: &[(f64, u32)]) {
        let width = canvas.width() as i32;
        let left = canvas.left() as i32;
        let bottom = canvas.bottom() as i32;
        let plot_width = canvas.plot_width() as i32;
        let img = canvas.image_mut();

        self.centered(img, TITLE, TITLE_SIZE, width / 2, 3);
        self.text(img, Y_LABEL, LABEL_SIZE, 4, 22, BLACK);

        for &(value, px) in ticks {
            self.centered(img, &tick_label(value), TICK_SIZE, px as i32, bottom + 7);
        }
        self.centered(img, X_LABEL, LABEL_SIZE, left + plot_width / 2, bottom + 21);

        // Right-aligned, last entry nearest the edge
        let scale = Scale::uniform(LABEL_SIZE);
        let mut x = width - 4;
        for (label, color) in LEGEND.iter().rev() {
            let (w, _) = text_size(scale, &self.font, label);
            x -= w;
            self.text(img, label, LABEL_SIZE, x, 22, BLACK);
            x -= SWATCH as i32 + 4;
            draw_filled_rect_mut(img, Rect::at(x, 24).of_size(SWATCH, SWATCH), *color);
            x -= 14;
        }
    }

    fn text(&self, img: &mut RgbImage, text: &str, size: f32, x: i32, y: i32, color: Rgb<u8>) {
        draw_text_mut(img, color, x, y, Scale::uniform(size), &self.font, text);
    }

    fn centered(&self, img: &mut RgbImage, text: &str, size: f32, center_x: i32, y: i32) {
        let (w, _) = text_size(Scale::uniform(size), &self.font, text);
        self.text(img, text, size, center_x - w / 2, y, BLACK);
    }
}

fn tick_label(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
