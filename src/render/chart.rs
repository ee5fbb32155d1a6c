//! Chart cosmetics and plot-area geometry.
//!
//! Everything here is pure: the CPU renderer turns a [`ChartLayout`] into pixels.

use std::path::PathBuf;

use kurbo::{BezPath, Point, Rect};

use crate::foundation::core::{Canvas, Rgba};
use crate::foundation::error::{YoyError, YoyResult};

pub const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Configurable chart decoration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Figure size in inches; multiplied by the dpi to get pixels.
    pub width_in: f64,
    pub height_in: f64,
    pub background: Rgba,
    pub foreground: Rgba,
    pub muted: Rgba,
    /// Subtitle, axis label and credit headings.
    pub text: Rgba,
    /// Last day of the x axis.
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Curve stroke width in points.
    pub line_width_pt: f64,
    pub font_family: String,
    pub title: String,
    pub subtitle: String,
    pub y_label: String,
    pub data_credit: String,
    pub source_credit: String,
    pub graphic_credit: String,
    /// Extra directories scanned for font files on top of the system fonts.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width_in: 9.0,
            height_in: 5.5,
            background: Rgba::new_const(0.0, 0.0, 0.0, 1.0),
            foreground: Rgba::WHITE,
            muted: Rgba::new_const(0.5, 0.5, 0.5, 1.0),
            text: Rgba::new_const(220.0 / 255.0, 220.0 / 255.0, 220.0 / 255.0, 1.0),
            x_max: 365.0,
            y_min: 0.0,
            y_max: 10.0,
            line_width_pt: 1.0,
            font_family: "Arial".to_string(),
            title: "HELSINKI KAISANIEMI".to_string(),
            subtitle: "Daily air temperatures".to_string(),
            y_label: "Temperature (°C)".to_string(),
            data_credit: "Finnish Meteorological Institute (FMA)".to_string(),
            source_credit: "https://www.ilmatieteenlaitos.fi/havaintojen-lataus (2023-09-20)"
                .to_string(),
            graphic_credit: "Rasmus Haapaniemi".to_string(),
            font_dirs: Vec::new(),
        }
    }
}

impl ChartStyle {
    pub fn validate(&self) -> YoyResult<()> {
        if !(self.y_max > self.y_min) || !self.y_min.is_finite() || !self.y_max.is_finite() {
            return Err(YoyError::validation(format!(
                "chart y range must satisfy y_min < y_max, got {}..{}",
                self.y_min, self.y_max
            )));
        }
        if !(self.x_max.is_finite() && self.x_max > 0.0) {
            return Err(YoyError::validation("chart x_max must be > 0"));
        }
        if !(self.line_width_pt.is_finite() && self.line_width_pt > 0.0) {
            return Err(YoyError::validation("chart line width must be > 0"));
        }
        Ok(())
    }
}

/// Pixel geometry of one chart at a given dpi.
#[derive(Clone, Debug)]
pub struct ChartLayout {
    pub canvas: Canvas,
    pub dpi: u32,
    /// Plot area in pixels (y grows downward).
    pub plot: Rect,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

// Margins as fractions of the canvas, leaving room for the title block and credits.
const MARGIN_LEFT: f64 = 0.085;
const MARGIN_RIGHT: f64 = 0.03;
const MARGIN_TOP: f64 = 0.2;
const MARGIN_BOTTOM: f64 = 0.2;
const MAX_VALUE_TICKS: usize = 11;

impl ChartLayout {
    pub fn new(style: &ChartStyle, dpi: u32) -> YoyResult<Self> {
        style.validate()?;
        let canvas = Canvas::from_inches(style.width_in, style.height_in, dpi)?;
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let plot = Rect::new(
            w * MARGIN_LEFT,
            h * MARGIN_TOP,
            w * (1.0 - MARGIN_RIGHT),
            h * (1.0 - MARGIN_BOTTOM),
        );
        Ok(Self {
            canvas,
            dpi,
            plot,
            x_max: style.x_max,
            y_min: style.y_min,
            y_max: style.y_max,
        })
    }

    /// Points to pixels at this layout's dpi.
    pub fn pt(&self, points: f64) -> f64 {
        points * f64::from(self.dpi) / 72.0
    }

    /// Inches to pixels at this layout's dpi.
    pub fn inch(&self, inches: f64) -> f64 {
        inches * f64::from(self.dpi)
    }

    /// Map a (day of year, value) data point to pixel space.
    pub fn to_px(&self, day: f64, value: f64) -> Point {
        let x = self.plot.x0 + day / self.x_max * self.plot.width();
        let t = (value - self.y_min) / (self.y_max - self.y_min);
        let y = self.plot.y1 - t * self.plot.height();
        Point::new(x, y)
    }

    /// Map an axes-relative position (`0..1` inside the plot, may exceed it) to pixels.
    pub fn axes_fraction(&self, fx: f64, fy: f64) -> Point {
        Point::new(
            self.plot.x0 + fx * self.plot.width(),
            self.plot.y1 - fy * self.plot.height(),
        )
    }

    /// X positions (days) of the vertical grid lines.
    pub fn grid_days(&self) -> Vec<f64> {
        linspace(30.0, 335.0, 11)
    }

    /// Y positions (values) of the horizontal grid lines.
    pub fn grid_values(&self) -> Vec<f64> {
        linspace(self.y_min, self.y_max, 10)
    }

    /// X positions (days) of the month tick labels.
    pub fn month_ticks(&self) -> Vec<f64> {
        linspace(0.0, 335.0, 12)
    }

    /// Integer value ticks within the y range, thinned to at most 11 labels.
    pub fn value_ticks(&self) -> Vec<f64> {
        let span = self.y_max - self.y_min;
        let step = (span / 10.0).ceil().max(1.0);
        let first = (self.y_min / step).ceil() * step;
        let n = ((self.y_max + 1e-9 - first) / step).floor();
        if !(n >= 0.0) {
            return Vec::new();
        }
        // Counted, not accumulated: at large magnitudes `v + step` can round back to `v`.
        let n = n.min(MAX_VALUE_TICKS as f64 - 1.0) as u32;
        let mut out: Vec<f64> = (0..=n)
            .map(|i| first + step * f64::from(i))
            .filter(|v| *v <= self.y_max + 1e-9)
            .collect();
        out.dedup();
        out
    }

    /// Polyline through `points`, clipped to the plot area's vertical extent.
    ///
    /// Segments leaving the value range are cut at the boundary, so each run of visible
    /// segments becomes its own subpath.
    pub fn polyline(&self, points: impl IntoIterator<Item = (f64, f64)>) -> BezPath {
        let mut path = BezPath::new();
        let mut prev: Option<Point> = None;
        let mut pen: Option<Point> = None;
        for (day, value) in points {
            let p = self.to_px(day, value);
            if let Some(a) = prev
                && let Some((c0, c1)) = clip_segment(a, p, self.plot.y0, self.plot.y1)
            {
                if pen != Some(c0) {
                    path.move_to(c0);
                }
                path.line_to(c1);
                pen = Some(c1);
            }
            prev = Some(p);
        }
        path
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Clip segment `a..b` to `y0 <= y <= y1`.
fn clip_segment(a: Point, b: Point, y0: f64, y1: f64) -> Option<(Point, Point)> {
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let dy = b.y - a.y;
    for (p, q) in [(-dy, a.y - y0), (dy, y1 - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    let c0 = if t0 == 0.0 { a } else { a.lerp(b, t0) };
    let c1 = if t1 == 1.0 { b } else { a.lerp(b, t1) };
    Some((c0, c1))
}

#[cfg(test)]
#[path = "../../tests/unit/render/chart.rs"]
mod tests;
