//! # acs-report-core
//!
//! Input model, compliance analysis and PDF orchestration for municipal ACS
//! (community health agent) reports.
//!
//! - **record**: period records and the report input, with validation
//! - **compliance**: pure regulatory analysis of the records
//! - **format**: Brazilian currency, count and period formatting
//! - **config**: page, chart and compliance settings
//! - **generator**: the section pipeline and its failure policy
//! - **error**: error types for the pipeline
//!
//! ## Design Principle
//!
//! This crate performs no I/O of its own. The logo comes through an
//! [`AssetProvider`](acs_report_traits::AssetProvider) and the document is
//! drawn onto a [`DrawingSurface`](acs_report_render_core::DrawingSurface);
//! the default surface writes into memory.

pub use acs_report_chart as chart;
pub use acs_report_layout as layout;
pub use acs_report_render_core as render;
pub use acs_report_resource as resource;
pub use acs_report_traits as traits;
pub use acs_report_types as types;

pub mod compliance;
pub mod config;
pub mod error;
pub mod format;
pub mod generator;
pub mod record;
mod sections;

pub use compliance::{
    ComplianceFinding, ComplianceLevel, ComplianceReport, ComplianceSettings, Criterion, RegulatoryAlert,
    Severity, analyze,
};
pub use config::{ChartSettings, ReportConfig};
pub use error::{Phase, ReportError, SectionError, SectionFailure};
pub use generator::{GeneratedReport, ReportGenerator};
pub use record::{PeriodRecord, ReportInput};
