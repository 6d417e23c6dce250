//! # acs-report
//!
//! Municipal ACS dashboard reports as paged PDF documents.
//!
//! The engine crates are re-exported here so embedders need a single
//! dependency:
//!
//! ```no_run
//! use acs_report::{PeriodRecord, ReportConfig, ReportGenerator, ReportInput};
//!
//! # fn main() -> Result<(), acs_report::ReportError> {
//! let input = ReportInput::new(
//!     "Anadia",
//!     "AL",
//!     vec![
//!         PeriodRecord::new("202501", 12_000.0, 11_500.0, 44, 42),
//!         PeriodRecord::new("202502", 12_000.0, 11_800.0, 44, 43),
//!     ],
//! );
//! let report = ReportGenerator::new(ReportConfig::default())?.generate(&input)?;
//! std::fs::write("relatorio.pdf", &report.bytes).ok();
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use acs_report_chart::{
    BackendError, BarChartBackend, ChartConversionError, ChartRasterizer, ChartSpec, RasterBackend, RasterImage,
    RasterSize, Series,
};
pub use acs_report_core::{
    ChartSettings, ComplianceFinding, ComplianceLevel, ComplianceReport, ComplianceSettings, Criterion,
    GeneratedReport, PeriodRecord, Phase, RegulatoryAlert, ReportConfig, ReportError, ReportGenerator,
    ReportInput, SectionError, SectionFailure, Severity, analyze, format,
};
pub use acs_report_layout::{
    ElementKind, LayoutCursor, LayoutError, LayoutValidator, PageConfig, PlacedElement, ValidationReport,
};
pub use acs_report_render_core::{DrawingSurface, ImageRef, Paint, RenderError, TextStyle};
pub use acs_report_render_lopdf::LopdfSurface;
pub use acs_report_resource::{
    FilesystemAssetProvider, InMemoryAssetProvider, ResourceCleanupError, ResourceKind, ResourceScope,
};
pub use acs_report_traits::{AssetError, AssetProvider};
pub use acs_report_types::{BoundingBox, Color, DataValidationError, Font, Rect};
pub use error::CliError;

use chrono::NaiveDateTime;

/// `Relatorio_ACS_<municipality>_<YYYYmmdd_HHMMSS>.pdf`, keeping only the part
/// of the name before any `/` and replacing spaces with underscores.
pub fn default_file_name(municipality: &str, at: NaiveDateTime) -> String {
    let name = municipality
        .split('/')
        .next()
        .unwrap_or(municipality)
        .trim()
        .replace(' ', "_");
    format!("Relatorio_ACS_{}_{}.pdf", name, at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_file_name() {
        let at = NaiveDate::from_ymd_opt(2025, 7, 21)
            .and_then(|d| d.and_hms_opt(16, 58, 16))
            .unwrap();
        assert_eq!(
            default_file_name("Palmeira dos Índios/AL", at),
            "Relatorio_ACS_Palmeira_dos_Índios_20250721_165816.pdf"
        );
        assert_eq!(default_file_name("Anadia", at), "Relatorio_ACS_Anadia_20250721_165816.pdf");
    }
}
