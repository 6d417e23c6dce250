//! Chart descriptions and their conversion into embeddable raster images.
//!
//! - [`ChartSpec`]: an immutable grouped-bar description
//! - [`RasterBackend`]: the seam where pixels get produced ([`BarChartBackend`] by default)
//! - [`ChartRasterizer`]: normalization, scaling and placeholder fallback

pub mod backend;
pub mod raster;
pub mod rasterizer;
pub mod spec;

pub use backend::{BackendError, BarChartBackend, LEGEND_SWATCH, RasterBackend};
pub use raster::RasterImage;
pub use rasterizer::{ChartConversionError, ChartRasterizer, DEFAULT_DPI, MAX_DPI, PLACEHOLDER_FILL, Rendered};
pub use spec::{ChartMargins, ChartSpec, ChartStyle, PlotFrame, RasterSize, Series};
