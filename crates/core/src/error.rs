//! Error types for report generation.

use acs_report_chart::ChartConversionError;
use acs_report_layout::LayoutError;
use acs_report_render_core::RenderError;
use acs_report_resource::ResourceCleanupError;
use acs_report_types::DataValidationError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The fixed steps of document generation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Header,
    Indicators,
    ComparativeChart,
    PersonnelChart,
    MonthlySummary,
    CompliancePanel,
    Footer,
    Pagination,
    Finalize,
}

impl Phase {
    /// Structural phases abort the document when they fail. The others are
    /// replaced by an inline placeholder.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Phase::Header | Phase::Footer | Phase::Pagination | Phase::Finalize
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Header => "header",
            Phase::Indicators => "indicators",
            Phase::ComparativeChart => "comparative chart",
            Phase::PersonnelChart => "personnel chart",
            Phase::MonthlySummary => "monthly summary",
            Phase::CompliancePanel => "compliance panel",
            Phase::Footer => "footer",
            Phase::Pagination => "pagination",
            Phase::Finalize => "finalization",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a single section could not be drawn.
#[derive(Error, Debug)]
pub enum SectionError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Chart(#[from] ChartConversionError),
    #[error(transparent)]
    Data(#[from] DataValidationError),
}

/// The main error enum for report generation.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid report data: {0}")]
    DataValidation(#[from] DataValidationError),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    ChartConversion(#[from] ChartConversionError),
    #[error("Resource cleanup failed: {0}")]
    ResourceCleanup(#[from] ResourceCleanupError),
    #[error("Document generation failed in {phase}: {source}")]
    DocumentGeneration {
        phase: Phase,
        #[source]
        source: SectionError,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReportError {
    pub fn generation(phase: Phase, source: impl Into<SectionError>) -> Self {
        ReportError::DocumentGeneration {
            phase,
            source: source.into(),
        }
    }
}

/// A content section that was replaced by a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionFailure {
    pub phase: Phase,
    pub page: u32,
    pub message: String,
}
