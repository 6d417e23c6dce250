use acs_report_types::{Color, DataValidationError};

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl RasterSize {
    /// Largest raster accepted, in pixels (a 450 x 300 pt chart at 600 dpi
    /// is about 9.4 million).
    pub const MAX_PIXELS: u64 = 16_000_000;

    pub fn new(width: u32, height: u32) -> Result<Self, DataValidationError> {
        if width == 0 || height == 0 {
            return Err(DataValidationError::new(
                "raster_size",
                format!("must be at least 1x1 pixels, got {width}x{height}"),
            ));
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > Self::MAX_PIXELS {
            return Err(DataValidationError::new(
                "raster_size",
                format!("{width}x{height} is {pixels} pixels, above the limit of {}", Self::MAX_PIXELS),
            ));
        }
        Ok(Self { width, height })
    }

    /// Pixel size of a `width_pt` x `height_pt` box rendered at `dpi`.
    pub fn from_points(width_pt: f32, height_pt: f32, dpi: f32) -> Result<Self, DataValidationError> {
        let scale = dpi / 72.0;
        let to_px = |v: f32| (v * scale).round();
        let (w, h) = (to_px(width_pt), to_px(height_pt));
        if !w.is_finite() || !h.is_finite() || w < 1.0 || h < 1.0 || w > u32::MAX as f32 || h > u32::MAX as f32 {
            return Err(DataValidationError::new(
                "raster_size",
                format!("{width_pt}x{height_pt}pt at {dpi} dpi is not a drawable size"),
            ));
        }
        Self::new(w as u32, h as u32)
    }
}

/// Plot-area margins in 72-dpi points. Scaled by `dpi / 72` when rasterized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartMargins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for ChartMargins {
    fn default() -> Self {
        Self {
            left: 40.0,
            right: 40.0,
            top: 50.0,
            bottom: 40.0,
        }
    }
}

/// Plot area inside a chart box, measured from the box's top-left corner in
/// the box's own units. The backend uses it in pixels; callers annotating the
/// embedded image use it in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Legend swatches sit at this fraction of the top margin.
const LEGEND_BAND: f32 = 2.0 / 3.0;

impl PlotFrame {
    /// Negative margins count as zero; margins that would leave less than one
    /// unit of plot shrink proportionally.
    pub fn new(margins: ChartMargins, width: f32, height: f32) -> Self {
        let (left, right) = fit(margins.left.max(0.0), margins.right.max(0.0), width);
        let (top, bottom) = fit(margins.top.max(0.0), margins.bottom.max(0.0), height);
        Self {
            left,
            right: width - right,
            top,
            bottom: height - bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Width of one category group.
    pub fn slot_width(&self, categories: usize) -> f32 {
        self.width() / categories.max(1) as f32
    }

    /// Horizontal middle of category `index`.
    pub fn slot_center(&self, index: usize, categories: usize) -> f32 {
        self.left + (index as f32 + 0.5) * self.slot_width(categories)
    }

    /// Left edge of the legend entry for series `index`.
    pub fn legend_x(&self, index: usize, series: usize) -> f32 {
        self.left + index as f32 * self.width() / series.max(1) as f32
    }

    /// Vertical middle of the legend strip.
    pub fn legend_center(&self) -> f32 {
        self.top * LEGEND_BAND
    }
}

fn fit(a: f32, c: f32, extent: f32) -> (f32, f32) {
    let budget = (extent - 1.0).max(0.0);
    if a + c <= budget {
        return (a, c);
    }
    let factor = if a + c > 0.0 { budget / (a + c) } else { 0.0 };
    ((a * factor).floor(), (c * factor).floor())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color,
    /// `(x label, value)` in display order.
    pub points: Vec<(String, f64)>,
}

impl Series {
    pub fn new(name: impl Into<String>, color: Color, points: Vec<(String, f64)>) -> Self {
        Self {
            name: name.into(),
            color,
            points,
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|(label, _)| label.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub background: Option<Color>,
    pub margins: Option<ChartMargins>,
    pub axis_color: Color,
    pub grid_color: Color,
    /// Fraction of each category slot left empty between bar groups.
    pub bar_gap: f32,
    pub grid_lines: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            background: None,
            margins: None,
            axis_color: Color::gray(0x44),
            grid_color: Color::gray(0xE0),
            bar_gap: 0.2,
            grid_lines: 5,
        }
    }
}

/// A grouped bar chart description. Built fresh for every chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub series: Vec<Series>,
    pub size: RasterSize,
    pub style: ChartStyle,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, size: RasterSize) -> Self {
        Self {
            title: title.into(),
            series: Vec::new(),
            size,
            style: ChartStyle::default(),
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// X labels of the first series.
    pub fn categories(&self) -> Vec<&str> {
        self.series
            .first()
            .map(|s| s.labels().collect())
            .unwrap_or_default()
    }

    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|(_, v)| *v))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_scales_by_dpi() {
        let size = RasterSize::from_points(450.0, 300.0, 144.0).unwrap();
        assert_eq!((size.width, size.height), (900, 600));
        assert!(RasterSize::from_points(0.2, 10.0, 72.0).is_err());
        assert!(RasterSize::new(0, 10).is_err());
    }

    #[test]
    fn test_oversized_rasters_are_rejected() {
        assert!(RasterSize::from_points(450.0, 300.0, 600.0).is_ok());
        let err = RasterSize::from_points(450.0, 300.0, 20_000.0).unwrap_err();
        assert_eq!(err.field, "raster_size");
        assert!(RasterSize::from_points(f32::MAX, 300.0, 72.0).is_err());
        assert!(RasterSize::new(4_001, 4_000).is_err());
        assert!(RasterSize::new(4_000, 4_000).is_ok());
    }

    #[test]
    fn test_plot_frame_geometry() {
        let frame = PlotFrame::new(ChartMargins::default(), 450.0, 300.0);
        assert_eq!((frame.left, frame.right, frame.top, frame.bottom), (40.0, 410.0, 50.0, 260.0));
        assert_eq!(frame.slot_width(2), 185.0);
        assert_eq!(frame.slot_center(1, 2), 317.5);
        assert_eq!(frame.legend_x(1, 2), 225.0);

        let squeezed = PlotFrame::new(ChartMargins::default(), 41.0, 300.0);
        assert_eq!((squeezed.left, squeezed.right), (20.0, 21.0));
        assert_eq!(squeezed.width(), 1.0);
    }

    #[test]
    fn test_categories_and_max() {
        let spec = ChartSpec::new("t", RasterSize::new(10, 10).unwrap())
            .with_series(Series::new(
                "a",
                Color::BLACK,
                vec![("01/2025".into(), 3.0), ("02/2025".into(), 9.5)],
            ))
            .with_series(Series::new(
                "b",
                Color::WHITE,
                vec![("01/2025".into(), 4.0), ("02/2025".into(), 1.0)],
            ));
        assert_eq!(spec.categories(), vec!["01/2025", "02/2025"]);
        assert_eq!(spec.max_value(), 9.5);
    }
}
