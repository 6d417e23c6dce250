//! Chart-to-raster conversion with graceful degradation.
//!
//! Every chart passes through the same pipeline: normalize background and
//! margins, hand it to the backend at `dpi / 72` scale, and fall back to a
//! neutral placeholder of the requested size when anything short of a broken
//! backend goes wrong.

use crate::backend::{BackendError, BarChartBackend, RasterBackend};
use crate::raster::RasterImage;
use crate::spec::{ChartMargins, ChartSpec, RasterSize};
use acs_report_types::Color;
use image::Rgb;
use log::{debug, warn};
use std::fmt::Display;
use thiserror::Error;

pub const DEFAULT_DPI: f32 = 150.0;
/// Highest resolution charts are rasterized at.
pub const MAX_DPI: f32 = 600.0;
pub const PLACEHOLDER_FILL: Color = Color::rgb(0xF0, 0xF0, 0xF0);
const PLACEHOLDER_BORDER: Color = Color::rgb(0xC8, 0xC8, 0xC8);

/// The chart could not be converted because the raster backend itself is
/// unusable. Always fatal for the document.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Chart conversion failed for '{chart}': {message}")]
pub struct ChartConversionError {
    pub chart: String,
    pub message: String,
}

/// A rasterized chart, or the placeholder that stands in for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub image: RasterImage,
    /// Set when the image is a placeholder; holds the reason.
    pub fallback_reason: Option<String>,
}

impl Rendered {
    pub fn is_placeholder(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[derive(Debug)]
pub struct ChartRasterizer {
    backend: Box<dyn RasterBackend>,
    dpi: f32,
    background: Color,
    margins: ChartMargins,
}

impl Default for ChartRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl ChartRasterizer {
    pub fn new(dpi: f32) -> Self {
        Self::with_backend(BarChartBackend::new(), dpi)
    }

    pub fn with_backend<B: RasterBackend + 'static>(backend: B, dpi: f32) -> Self {
        let dpi = if !dpi.is_finite() || dpi <= 0.0 {
            DEFAULT_DPI
        } else if dpi > MAX_DPI {
            warn!("Chart resolution {dpi} dpi capped at {MAX_DPI}");
            MAX_DPI
        } else {
            dpi
        };
        Self {
            backend: Box::new(backend),
            dpi,
            background: Color::WHITE,
            margins: ChartMargins::default(),
        }
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn scale(&self) -> f32 {
        self.dpi / 72.0
    }

    /// Plot margins in points, applied to every chart.
    pub fn margins(&self) -> ChartMargins {
        self.margins
    }

    /// Forces the house background and margins onto a chart description.
    pub fn normalize(&self, spec: &ChartSpec) -> ChartSpec {
        let mut normalized = spec.clone();
        normalized.style.background = Some(self.background);
        normalized.style.margins = Some(self.margins);
        normalized
    }

    /// Converts one chart.
    ///
    /// # Errors
    ///
    /// Only when the backend reports itself unavailable or misconfigured.
    /// Every other failure produces a placeholder.
    pub fn render(&self, spec: &ChartSpec) -> Result<Rendered, ChartConversionError> {
        let normalized = self.normalize(spec);
        match self.backend.rasterize(&normalized, self.scale()) {
            Ok(image) if image.matches(spec.size) => {
                debug!("Chart '{}' rendered by {}", spec.title, self.backend.name());
                Ok(Rendered {
                    image,
                    fallback_reason: None,
                })
            }
            Ok(image) => {
                let (w, h) = image.size();
                let reason = format!(
                    "backend returned {}x{} instead of {}x{}",
                    w, h, spec.size.width, spec.size.height
                );
                warn!("Chart '{}': {}; using placeholder", spec.title, reason);
                Ok(self.fallback(spec.size, reason))
            }
            Err(e) if e.is_fatal() => Err(ChartConversionError {
                chart: spec.title.clone(),
                message: e.to_string(),
            }),
            Err(e) => {
                warn!("Chart '{}' failed to render: {}; using placeholder", spec.title, e);
                Ok(self.fallback(spec.size, e.to_string()))
            }
        }
    }

    /// Builds and converts a chart, guaranteeing an image of exactly `size`.
    ///
    /// A failing `build` yields a placeholder; only backend breakage escapes.
    pub fn render_with_fallback<F, E>(
        &self,
        build: F,
        description: &str,
        size: RasterSize,
    ) -> Result<Rendered, ChartConversionError>
    where
        F: FnOnce() -> Result<ChartSpec, E>,
        E: Display,
    {
        let mut spec = match build() {
            Ok(spec) => spec,
            Err(e) => {
                warn!("Could not build {}: {}; using placeholder", description, e);
                return Ok(self.fallback(size, format!("{description}: {e}")));
            }
        };
        spec.size = size;
        self.render(&spec).map_err(|e| ChartConversionError {
            chart: description.to_string(),
            message: e.message,
        })
    }

    /// Neutral light-gray image with a thin border, exactly `size` pixels.
    pub fn placeholder(&self, size: RasterSize) -> RasterImage {
        let mut pixels = RasterImage::solid(size, PLACEHOLDER_FILL).into_inner();
        let border = Rgb([PLACEHOLDER_BORDER.r, PLACEHOLDER_BORDER.g, PLACEHOLDER_BORDER.b]);
        let (w, h) = (size.width, size.height);
        for x in 0..w {
            pixels.put_pixel(x, 0, border);
            pixels.put_pixel(x, h - 1, border);
        }
        for y in 0..h {
            pixels.put_pixel(0, y, border);
            pixels.put_pixel(w - 1, y, border);
        }
        RasterImage::from_rgb(pixels)
    }

    fn fallback(&self, size: RasterSize, reason: String) -> Rendered {
        Rendered {
            image: self.placeholder(size),
            fallback_reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Series;

    #[derive(Debug)]
    struct FailingBackend(BackendError);

    impl RasterBackend for FailingBackend {
        fn rasterize(&self, _spec: &ChartSpec, _scale: f32) -> Result<RasterImage, BackendError> {
            Err(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "FailingBackend"
        }
    }

    #[derive(Debug)]
    struct WrongSizeBackend;

    impl RasterBackend for WrongSizeBackend {
        fn rasterize(&self, _spec: &ChartSpec, _scale: f32) -> Result<RasterImage, BackendError> {
            Ok(RasterImage::solid(RasterSize::new(5, 5).unwrap(), Color::BLACK))
        }

        fn name(&self) -> &'static str {
            "WrongSizeBackend"
        }
    }

    fn size() -> RasterSize {
        RasterSize::new(120, 80).unwrap()
    }

    fn valid_spec() -> ChartSpec {
        ChartSpec::new("Comparison", size()).with_series(Series::new(
            "received",
            Color::rgb(0x2C, 0xA0, 0x2C),
            vec![("01/2025".into(), 10.0), ("02/2025".into(), 12.0)],
        ))
    }

    #[test]
    fn test_scale_follows_dpi() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(ChartRasterizer::new(144.0).scale(), 2.0);
        assert_eq!(ChartRasterizer::new(-3.0).dpi(), DEFAULT_DPI);
        assert_eq!(ChartRasterizer::new(20_000.0).dpi(), MAX_DPI);
    }

    #[test]
    fn test_normalize_forces_white_background_and_margins() {
        let mut spec = valid_spec();
        spec.style.background = Some(Color::BLACK);
        let normalized = ChartRasterizer::default().normalize(&spec);
        assert_eq!(normalized.style.background, Some(Color::WHITE));
        assert_eq!(normalized.style.margins, Some(ChartMargins::default()));
    }

    #[test]
    fn test_render_success() {
        let rendered = ChartRasterizer::new(72.0).render(&valid_spec()).unwrap();
        assert!(!rendered.is_placeholder());
        assert_eq!(rendered.image.size(), (120, 80));
    }

    #[test]
    fn test_non_fatal_backend_error_gives_placeholder() {
        let rasterizer =
            ChartRasterizer::with_backend(FailingBackend(BackendError::Render("font cache".into())), 72.0);
        let rendered = rasterizer.render(&valid_spec()).unwrap();
        assert!(rendered.is_placeholder());
        assert_eq!(rendered.image.size(), (120, 80));
        assert_eq!(rendered.image.pixel(60, 40), Some(PLACEHOLDER_FILL));
    }

    #[test]
    fn test_fatal_backend_error_propagates() {
        let rasterizer = ChartRasterizer::with_backend(
            FailingBackend(BackendError::Unavailable("no raster engine installed".into())),
            72.0,
        );
        let err = rasterizer.render(&valid_spec()).unwrap_err();
        assert_eq!(err.chart, "Comparison");
        assert!(err.message.contains("no raster engine"));

        let err = rasterizer
            .render_with_fallback(|| Ok::<_, String>(valid_spec()), "personnel chart", size())
            .unwrap_err();
        assert_eq!(err.chart, "personnel chart");
    }

    #[test]
    fn test_wrong_size_output_is_replaced() {
        let rasterizer = ChartRasterizer::with_backend(WrongSizeBackend, 72.0);
        let rendered = rasterizer.render(&valid_spec()).unwrap();
        assert!(rendered.is_placeholder());
        assert_eq!(rendered.image.size(), (120, 80));
    }

    #[test]
    fn test_failing_build_yields_exact_size_placeholder() {
        let rasterizer = ChartRasterizer::default();
        let requested = RasterSize::new(33, 17).unwrap();
        let rendered = rasterizer
            .render_with_fallback(|| Err::<ChartSpec, _>("no data"), "comparative chart", requested)
            .unwrap();
        assert!(rendered.is_placeholder());
        assert_eq!(rendered.image.size(), (33, 17));
        assert!(rendered.fallback_reason.unwrap().contains("no data"));
    }

    #[test]
    fn test_fallback_overrides_spec_size() {
        let rendered = ChartRasterizer::new(72.0)
            .render_with_fallback(|| Ok::<_, String>(valid_spec()), "chart", RasterSize::new(200, 90).unwrap())
            .unwrap();
        assert!(!rendered.is_placeholder());
        assert_eq!(rendered.image.size(), (200, 90));
    }

    #[test]
    fn test_invalid_spec_degrades() {
        let empty = ChartSpec::new("empty", size());
        let rendered = ChartRasterizer::default().render(&empty).unwrap();
        assert!(rendered.is_placeholder());
    }
}
