use crate::compliance::ComplianceSettings;
use crate::error::ReportError;
use acs_report_chart::{DEFAULT_DPI, MAX_DPI, RasterSize};
use acs_report_layout::PageConfig;
use serde::{Deserialize, Serialize};

/// Target size of each chart on the page, in points, and its raster density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: f32,
    pub height: f32,
    pub dpi: f32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 450.0,
            height: 300.0,
            dpi: DEFAULT_DPI,
        }
    }
}

/// Everything that shapes one generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub page: PageConfig,
    pub chart: ChartSettings,
    pub compliance: ComplianceSettings,
    pub title: String,
    pub footer_text: String,
    /// Distance above the bottom margin the compliance panel must stay clear of.
    pub footer_safety_zone: f32,
    /// Asset paths tried in order for the header logo.
    pub logo_candidates: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            chart: ChartSettings::default(),
            compliance: ComplianceSettings::default(),
            title: "Dashboard ACS - Análise Municipal".to_string(),
            footer_text: "© Mais Gestor (2025) - Todos os direitos reservados".to_string(),
            footer_safety_zone: 100.0,
            logo_candidates: ["logo.png", "logo.jpg", "logo.jpeg", "assets/logo.png", "images/logo.png"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ReportConfig {
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ReportError::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        self.page.validate()?;
        let chart = &self.chart;
        if !(chart.width > 0.0 && chart.height > 0.0 && chart.dpi > 0.0)
            || ![chart.width, chart.height, chart.dpi].iter().all(|v| v.is_finite())
        {
            return Err(ReportError::Config(format!(
                "chart size {}x{} at {} dpi is not usable",
                chart.width, chart.height, chart.dpi
            )));
        }
        if chart.dpi > MAX_DPI {
            return Err(ReportError::Config(format!(
                "chart dpi {} is above the maximum of {MAX_DPI}",
                chart.dpi
            )));
        }
        RasterSize::from_points(chart.width, chart.height, chart.dpi)
            .map_err(|e| ReportError::Config(format!("chart raster too large: {}", e.rule)))?;
        if !self.footer_safety_zone.is_finite() || self.footer_safety_zone < 0.0 {
            return Err(ReportError::Config(format!(
                "footer_safety_zone must be non-negative, got {}",
                self.footer_safety_zone
            )));
        }
        Ok(())
    }
}
