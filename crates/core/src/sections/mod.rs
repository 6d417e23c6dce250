//! The report's fixed sections and the drawing helpers they share.
//!
//! Every section knows its height before it draws, so the generator can ask
//! the layout cursor for room first and break the page when needed. Drawing
//! then happens inside the `area` the generator reserved.

mod charts;
mod compliance_panel;
mod footer;
mod header;
mod tables;

pub(crate) use charts::ChartSection;
pub(crate) use compliance_panel::CompliancePanelSection;
pub(crate) use footer::draw_footer;
pub(crate) use header::HeaderSection;
pub(crate) use tables::{IndicatorsSection, MonthlySummarySection};

use crate::compliance::ComplianceReport;
use crate::config::ReportConfig;
use crate::error::{Phase, SectionError};
use crate::record::PeriodRecord;
use acs_report_chart::ChartRasterizer;
use acs_report_layout::metrics::text_width;
use acs_report_layout::{ElementKind, LayoutCursor, PageConfig};
use acs_report_render_core::{DrawingSurface, Paint, TextStyle};
use acs_report_resource::ResourceScope;
use acs_report_traits::AssetProvider;
use acs_report_types::{Color, Font, Rect};
use chrono::NaiveDateTime;

const SECTION_TITLE_OFFSET: f32 = 15.0;
const FAILURE_FILL: Color = Color::rgb(0xFD, 0xEC, 0xEA);
const FAILURE_RED: Color = Color::rgb(0xD3, 0x2F, 0x2F);
pub(crate) const FAILURE_PLACEHOLDER_HEIGHT: f32 = 40.0;

/// Validated, chronologically sorted input plus everything derived from it.
#[derive(Debug, Clone)]
pub(crate) struct ReportData {
    pub municipality: String,
    pub region: String,
    pub periods: Vec<String>,
    /// Oldest first.
    pub records: Vec<PeriodRecord>,
    pub compliance: ComplianceReport,
    pub generated_at: NaiveDateTime,
}

impl ReportData {
    pub fn latest(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }

    pub fn previous(&self) -> Option<&PeriodRecord> {
        self.records.len().checked_sub(2).and_then(|i| self.records.get(i))
    }
}

/// Borrowed state a section draws with.
pub(crate) struct DrawContext<'a> {
    pub surface: &'a mut dyn DrawingSurface,
    pub scope: &'a mut ResourceScope,
    pub cursor: &'a LayoutCursor,
    pub data: &'a ReportData,
    pub config: &'a ReportConfig,
    pub rasterizer: &'a ChartRasterizer,
    pub assets: Option<&'a dyn AssetProvider>,
}

impl DrawContext<'_> {
    pub fn page(&self) -> &PageConfig {
        &self.config.page
    }

    /// Green marker plus bold green heading, the way every body section opens.
    pub fn section_title(&mut self, top: f32, title: &str) -> Result<(), SectionError> {
        let page = &self.config.page;
        let green = page.palette.dashboard_green;
        let baseline = top - SECTION_TITLE_OFFSET;
        self.surface
            .draw_rect(Rect::new(page.margin, baseline - 2.0, 15.0, 8.0), Paint::fill(green))?;
        self.surface.draw_text(
            page.margin + 25.0,
            baseline,
            title,
            TextStyle::bold(page.fonts.header).with_color(green),
        )?;
        Ok(())
    }

    /// Draws `text` horizontally centered in a cell whose vertical middle is `middle`.
    pub fn centered_text(&mut self, cell_x: f32, cell_width: f32, middle: f32, text: &str, style: TextStyle) -> Result<(), SectionError> {
        let width = text_width(text, style.font, style.size);
        let x = cell_x + (cell_width - width) / 2.0;
        self.surface.draw_text(x, middle - style.size * 0.35, text, style)?;
        Ok(())
    }

    /// Gray notice box used when a chart has nothing to show.
    pub fn notice_box(&mut self, area: Rect, message: &str) -> Result<(), SectionError> {
        self.surface.draw_rect(
            area,
            Paint::fill_and_stroke(Color::rgb(0xF5, 0xF5, 0xF5), Color::rgb(0xCC, 0xCC, 0xCC), 1.0),
        )?;
        let style = TextStyle::regular(12.0).with_color(Color::rgb(0x66, 0x66, 0x66));
        self.centered_text(area.x, area.width, area.y + area.height / 2.0, message, style)
    }

    /// Red inline box standing in for a section that failed to render.
    ///
    /// The whole reserved `area` is painted over first, so whatever the
    /// section drew before failing is hidden under the placeholder.
    pub fn failure_placeholder(&mut self, area: Rect, title: &str) -> Result<(), SectionError> {
        self.surface.draw_rect(area, Paint::fill(Color::WHITE))?;
        let height = FAILURE_PLACEHOLDER_HEIGHT.min(area.height);
        let top = area.top();
        self.surface.draw_rect(
            Rect::new(area.x, top - height, area.width, height),
            Paint::fill_and_stroke(FAILURE_FILL, FAILURE_RED, 1.0),
        )?;
        self.surface.draw_text(
            area.x + 10.0,
            top - height / 2.0 - 3.5,
            &format!("Seção indisponível: {title}"),
            TextStyle::new(Font::Bold, 10.0, FAILURE_RED),
        )?;
        Ok(())
    }
}

/// How a section finished drawing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Drawn {
    Complete,
    /// Drawn, but with a stand-in for part of the content.
    Degraded(String),
}

pub(crate) trait Section {
    fn phase(&self) -> Phase;

    /// Heading shown in the document and in failure placeholders.
    fn title(&self) -> &'static str;

    fn kind(&self) -> ElementKind;

    /// Height of the block in points. Must match what [`draw`](Section::draw) uses.
    fn height(&self, data: &ReportData, config: &ReportConfig) -> f32;

    /// Extra room that must stay free below the block.
    fn clearance(&self, _config: &ReportConfig) -> f32 {
        0.0
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<Drawn, SectionError>;
}
