use image::{Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
pub const GREY: Rgb<u8> = Rgb([200, 200, 200]);
pub const ORANGE: Rgb<u8> = Rgb([255, 127, 14]);
pub const RED: Rgb<u8> = Rgb([214, 39, 40]);

const DASH_ON: u32 = 8;
const DASH_OFF: u32 = 5;
const TICK_LENGTH: u32 = 5;

/// Pixel canvas with a data coordinate system (origin bottom-left)
pub struct Canvas {
    img: RgbImage,
    margin: u32,
    x_max: f64,
    y_max: f64,
}

impl Canvas {
    pub fn new(width: u32, height: u32, margin: u32, x_max: f64, y_max: f64) -> Self {
        Self {
            img: RgbImage::from_pixel(width, height, WHITE),
            margin,
            // Keep a degenerate range drawable
            x_max: if x_max > 0.0 { x_max } else { 1.0 },
            y_max: if y_max > 0.0 { y_max } else { 1.0 },
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn plot_width(&self) -> u32 {
        self.img.width() - 2 * self.margin
    }

    fn plot_height(&self) -> u32 {
        self.img.height() - 2 * self.margin
    }

    pub fn left(&self) -> u32 {
        self.margin
    }

    pub fn bottom(&self) -> u32 {
        self.img.height() - 1 - self.margin
    }

    /// Pixel position of a data point
    pub fn to_pixel(&self, x: f64, y: f64) -> (u32, u32) {
        let px = self.left() as f64 + (x / self.x_max).clamp(0.0, 1.0) * self.plot_width() as f64;
        let py = self.bottom() as f64 - (y / self.y_max).clamp(0.0, 1.0) * self.plot_height() as f64;
        (px.round() as u32, py.round() as u32)
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.img.width() && (y as u32) < self.img.height() {
            self.img.put_pixel(x as u32, y as u32, color);
        }
    }

    pub fn axes(&mut self) {
        let (left, bottom) = (self.left(), self.bottom());
        for x in left..=left + self.plot_width() {
            self.put(x as i64, bottom as i64, BLACK);
        }
        for y in bottom - self.plot_height()..=bottom {
            self.put(left as i64, y as i64, BLACK);
        }
    }

    /// Tick marks below the x axis every `step` data units. Returns each
    /// tick's value and pixel column.
    pub fn x_ticks(&mut self, step: f64) -> Vec<(f64, u32)> {
        let mut ticks = Vec::new();
        if step <= 0.0 || self.x_max / step > self.plot_width() as f64 {
            return ticks;
        }
        let bottom = self.bottom();
        let mut index = 0u32;
        loop {
            let value = step * index as f64;
            if value > self.x_max {
                break;
            }
            let (px, _) = self.to_pixel(value, 0.0);
            for dy in 1..=TICK_LENGTH {
                self.put(px as i64, (bottom + dy) as i64, BLACK);
            }
            ticks.push((value, px));
            index += 1;
        }
        ticks
    }

    /// 3x3 dot centred on a data point
    pub fn dot(&mut self, x: f64, y: f64, color: Rgb<u8>) {
        let (px, py) = self.to_pixel(x, y);
        for dy in -1..=1 {
            for dx in -1..=1 {
                self.put(px as i64 + dx, py as i64 + dy, color);
            }
        }
    }

    /// Ring of radius 6 around a data point
    pub fn marker(&mut self, x: f64, y: f64, color: Rgb<u8>) {
        let (px, py) = self.to_pixel(x, y);
        for dy in -7i64..=7 {
            for dx in -7i64..=7 {
                let r2 = dx * dx + dy * dy;
                if (25..=49).contains(&r2) {
                    self.put(px as i64 + dx, py as i64 + dy, color);
                }
            }
        }
    }

    pub fn dashed_hline(&mut self, y: f64, color: Rgb<u8>) {
        let (_, py) = self.to_pixel(0.0, y);
        let left = self.left();
        for offset in 0..=self.plot_width() {
            if offset % (DASH_ON + DASH_OFF) < DASH_ON {
                self.put((left + offset) as i64, py as i64, color);
            }
        }
    }

    pub fn dashed_vline(&mut self, x: f64, color: Rgb<u8>) {
        let (px, _) = self.to_pixel(x, 0.0);
        let bottom = self.bottom();
        for offset in 0..=self.plot_height() {
            if offset % (DASH_ON + DASH_OFF) < DASH_ON {
                self.put(px as i64, (bottom - offset) as i64, color);
            }
        }
    }

    pub fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.img
    }

    pub fn into_image(self) -> RgbImage {
        self.img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pixel_corners() {
        let canvas = Canvas::new(100, 80, 10, 50.0, 20.0);
        assert_eq!(canvas.to_pixel(0.0, 0.0), (10, 69));
        assert_eq!(canvas.to_pixel(50.0, 20.0), (90, 9));
        // Out of range values are clamped to the plot area
        assert_eq!(canvas.to_pixel(-5.0, 100.0), (10, 9));
    }

    #[test]
    fn test_axes_and_dashes() {
        let mut canvas = Canvas::new(100, 80, 10, 50.0, 20.0);
        canvas.axes();
        canvas.dashed_vline(25.0, RED);
        let img = canvas.into_image();
        assert_eq!(*img.get_pixel(10, 69), BLACK);
        assert_eq!(*img.get_pixel(50, 69), RED);
        assert_eq!(*img.get_pixel(50, 69 - DASH_ON), WHITE);
        assert_eq!(*img.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_x_ticks() {
        let mut canvas = Canvas::new(100, 80, 10, 50.0, 20.0);
        let ticks = canvas.x_ticks(20.0);
        assert_eq!(ticks, vec![(0.0, 10), (20.0, 42), (40.0, 74)]);
        let img = canvas.into_image();
        assert_eq!(*img.get_pixel(42, 70), BLACK);
        assert!(Canvas::new(100, 80, 10, 50.0, 20.0).x_ticks(0.0).is_empty());
    }

    #[test]
    fn test_degenerate_range() {
        let canvas = Canvas::new(100, 80, 10, 0.0, 0.0);
        assert_eq!(canvas.to_pixel(0.0, 0.0), (10, 69));
    }
}
