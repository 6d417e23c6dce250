//! Raster backends turn a normalized [`ChartSpec`] into pixels.

use crate::raster::{RasterImage, to_rgb};
use crate::spec::{ChartMargins, ChartSpec, PlotFrame};
use acs_report_types::Color;
use image::RgbImage;
use log::debug;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Raster backend unavailable: {0}")]
    Unavailable(String),
    #[error("Raster backend misconfigured: {0}")]
    Broken(String),
    #[error("Invalid chart description: {0}")]
    InvalidSpec(String),
    #[error("Chart rendering failed: {0}")]
    Render(String),
}

impl BackendError {
    /// Missing or misconfigured backends will fail every chart; nothing
    /// downstream can recover from that.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BackendError::Unavailable(_) | BackendError::Broken(_))
    }
}

pub trait RasterBackend: Send + Sync + Debug {
    /// Renders `spec` at exactly `spec.size`. `scale` converts the spec's
    /// point-based measurements (margins, strokes) into pixels.
    fn rasterize(&self, spec: &ChartSpec, scale: f32) -> Result<RasterImage, BackendError>;

    fn name(&self) -> &'static str;
}

/// Side of a legend swatch in points.
pub const LEGEND_SWATCH: f32 = 10.0;

/// Grouped vertical bars with a light grid and a legend strip.
#[derive(Debug, Default, Clone, Copy)]
pub struct BarChartBackend;

impl BarChartBackend {
    pub fn new() -> Self {
        Self
    }

    fn check(spec: &ChartSpec) -> Result<(), BackendError> {
        let Some(first) = spec.series.first() else {
            return Err(BackendError::InvalidSpec(format!(
                "chart '{}' has no series",
                spec.title
            )));
        };
        if first.points.is_empty() {
            return Err(BackendError::InvalidSpec(format!(
                "series '{}' has no points",
                first.name
            )));
        }
        for series in &spec.series {
            if !series.labels().eq(first.labels()) {
                return Err(BackendError::InvalidSpec(format!(
                    "series '{}' does not share the x labels of '{}'",
                    series.name, first.name
                )));
            }
            if let Some((label, value)) = series
                .points
                .iter()
                .find(|(_, v)| !v.is_finite() || *v < 0.0)
            {
                return Err(BackendError::InvalidSpec(format!(
                    "series '{}' has value {} at '{}'",
                    series.name, value, label
                )));
            }
        }
        Ok(())
    }
}

/// Rounds up to 1, 2 or 5 times a power of ten.
fn nice_ceiling(value: f64) -> f64 {
    if value <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    let normalized = value / magnitude;
    let step = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    step * magnitude
}

/// Margins in pixels, shrunk proportionally when they would not leave at
/// least one pixel of plot area.
fn pixel_margins(margins: ChartMargins, scale: f32, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let px = |v: f32| (v.max(0.0) * scale).round();
    let (mut l, mut r, mut t, mut b) = (px(margins.left), px(margins.right), px(margins.top), px(margins.bottom));

    let fit = |a: &mut f32, c: &mut f32, extent: u32| {
        let budget = extent.saturating_sub(1) as f32;
        if *a + *c > budget {
            let factor = if *a + *c > 0.0 { budget / (*a + *c) } else { 0.0 };
            *a = (*a * factor).floor();
            *c = (*c * factor).floor();
        }
    };
    fit(&mut l, &mut r, width);
    fit(&mut t, &mut b, height);
    (l as u32, r as u32, t as u32, b as u32)
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Color) {
    let pixel = to_rgb(color);
    let x1 = x1.min(img.width());
    let y1 = y1.min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, pixel);
        }
    }
}

impl RasterBackend for BarChartBackend {
    fn rasterize(&self, spec: &ChartSpec, scale: f32) -> Result<RasterImage, BackendError> {
        Self::check(spec)?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BackendError::Render(format!("invalid scale {scale}")));
        }

        let (width, height) = (spec.size.width, spec.size.height);
        let background = spec.style.background.unwrap_or(Color::WHITE);
        let mut img = RgbImage::from_pixel(width, height, to_rgb(background));

        let margins = spec.style.margins.unwrap_or_default();
        let (ml, mr, mt, mb) = pixel_margins(margins, scale, width, height);
        let (x0, x1) = (ml, width - mr);
        let (y0, y1) = (mt, height - mb);
        let frame = PlotFrame {
            left: x0 as f32,
            right: x1 as f32,
            top: y0 as f32,
            bottom: y1 as f32,
        };
        let plot_h = (y1 - y0) as f64;
        let stroke = (scale.round() as u32).max(1);

        let max = nice_ceiling(spec.max_value());
        for i in 0..=spec.style.grid_lines {
            let frac = i as f64 / spec.style.grid_lines.max(1) as f64;
            let y = (y1 as f64 - plot_h * frac).round() as u32;
            fill_rect(&mut img, x0, y.saturating_sub(stroke / 2), x1, y + stroke.div_ceil(2), spec.style.grid_color);
        }

        let categories = spec.categories().len();
        let slot = frame.slot_width(categories) as f64;
        let gap = spec.style.bar_gap.clamp(0.0, 0.9) as f64;
        let group = slot * (1.0 - gap);
        let bar = group / spec.series.len() as f64;

        for (s, series) in spec.series.iter().enumerate() {
            for (c, (_, value)) in series.points.iter().enumerate() {
                let left = frame.slot_center(c, categories) as f64 - group / 2.0 + s as f64 * bar;
                let bar_h = (value / max * plot_h).round();
                let top = (y1 as f64 - bar_h).max(y0 as f64);
                fill_rect(
                    &mut img,
                    left.round() as u32,
                    top as u32,
                    (left + bar).round() as u32,
                    y1,
                    series.color,
                );
            }
        }

        // Axes on top of grid and bars.
        fill_rect(&mut img, x0, y0, x0 + stroke, y1, spec.style.axis_color);
        fill_rect(&mut img, x0, y1.saturating_sub(stroke), x1, y1, spec.style.axis_color);

        // Legend swatches in the top margin; names are drawn by the caller.
        let swatch = ((LEGEND_SWATCH * scale).round() as u32).min(mt / 3);
        if swatch > 0 {
            let legend_y = (frame.legend_center().round() as u32).saturating_sub(swatch / 2);
            for (s, series) in spec.series.iter().enumerate() {
                let lx = frame.legend_x(s, spec.series.len()).round() as u32;
                fill_rect(&mut img, lx, legend_y, lx + swatch, legend_y + swatch, series.color);
            }
        }

        debug!(
            "Rasterized '{}' at {}x{} ({} series x {} categories)",
            spec.title,
            width,
            height,
            spec.series.len(),
            categories
        );
        Ok(RasterImage::from_rgb(img))
    }

    fn name(&self) -> &'static str {
        "BarChartBackend"
    }
}
