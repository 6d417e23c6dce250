//! Document generation.
//!
//! [`ReportGenerator`] validates the input, runs the compliance analysis and
//! walks the fixed section pipeline on a [`DrawingSurface`]. Each section
//! reserves its height through the [`LayoutCursor`] before drawing, so page
//! breaks (footer, new page, cursor reset) happen between sections and never
//! inside one.
//!
//! Failures are classified by phase: a content section that fails is replaced
//! by an inline placeholder and recorded as a warning; a structural phase that
//! fails aborts the whole document.

use crate::compliance::{ComplianceReport, analyze};
use crate::config::ReportConfig;
use crate::error::{Phase, ReportError, SectionError, SectionFailure};
use crate::record::ReportInput;
use crate::sections::{
    ChartSection, CompliancePanelSection, DrawContext, Drawn, FAILURE_PLACEHOLDER_HEIGHT, HeaderSection,
    IndicatorsSection, MonthlySummarySection, ReportData, Section, draw_footer,
};
use acs_report_chart::ChartRasterizer;
use acs_report_layout::{ElementKind, LayoutCursor, LayoutValidator, PageConfig, PlacedElement, Placement, ValidationReport};
use acs_report_render_core::DrawingSurface;
use acs_report_render_lopdf::LopdfSurface;
use acs_report_resource::{ResourceKind, ResourceScope};
use acs_report_traits::AssetProvider;
use acs_report_types::Rect;
use chrono::Local;
use log::{debug, info, warn};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

/// A finished document plus what generation learned about it.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub bytes: Vec<u8>,
    pub pages: u32,
    /// Every section block and footer, in drawing order.
    pub placements: Vec<PlacedElement>,
    /// Sections drawn as placeholders, with the reason.
    pub warnings: Vec<SectionFailure>,
    /// Resources released when generation closed, by kind.
    pub resources: BTreeMap<ResourceKind, usize>,
    pub compliance: ComplianceReport,
}

impl GeneratedReport {
    /// Runs the offline layout checks over the recorded placements.
    pub fn validate_layout(&self, page: &PageConfig) -> ValidationReport {
        let mut validator = LayoutValidator::for_page(page);
        validator.extend(self.placements.iter().cloned());
        validator.run_full_validation()
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Builds ACS reports. Holds only immutable configuration, so one generator
/// can serve many threads; every call gets its own cursor and resource scope.
#[derive(Debug)]
pub struct ReportGenerator {
    config: ReportConfig,
    assets: Option<Arc<dyn AssetProvider>>,
    rasterizer: ChartRasterizer,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        config.validate()?;
        let rasterizer = ChartRasterizer::new(config.chart.dpi);
        Ok(Self {
            config,
            assets: None,
            rasterizer,
        })
    }

    /// Source for the header logo. Without one the header draws the text glyph.
    pub fn with_assets(mut self, assets: Arc<dyn AssetProvider>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: ChartRasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Generates the PDF into memory.
    pub fn generate(&self, input: &ReportInput) -> Result<GeneratedReport, ReportError> {
        let page = &self.config.page;
        let mut surface = LopdfSurface::new(page.page_width, page.page_height)
            .map_err(|e| ReportError::Config(e.to_string()))?
            .with_title(format!("Relatório ACS - {}", input.municipality));
        self.generate_with_surface(input, &mut surface)
    }

    /// Generates onto a caller-provided surface, which must start with one open
    /// page of the configured size.
    pub fn generate_with_surface(
        &self,
        input: &ReportInput,
        surface: &mut dyn DrawingSurface,
    ) -> Result<GeneratedReport, ReportError> {
        input.validate()?;
        let data = self.prepare(input);
        info!(
            "Generating report for {}/{}: {} period(s), compliance {:.1}%",
            data.municipality,
            data.region,
            data.records.len(),
            data.compliance.compliance_rate
        );

        let label = format!("report {}/{}", data.municipality, data.region);
        let composed = ResourceScope::run(label, |scope| {
            let finished = Rc::new(Cell::new(false));
            let flag = Rc::clone(&finished);
            scope.register_deferred("drawing surface teardown", move || {
                if !flag.get() {
                    warn!("Generation stopped early; discarding the partially drawn document");
                }
                Ok(())
            });

            let mut cursor = LayoutCursor::new(self.config.page.clone());
            cursor.on_page_start(|page| {
                debug!("Page {} ready for sections", page);
                Ok(())
            });

            let composer = Composer {
                generator: self,
                data: &data,
                surface,
                scope,
                cursor,
                placements: Vec::new(),
                warnings: Vec::new(),
            };
            let composed = composer.run()?;
            finished.set(true);
            Ok::<_, ReportError>(composed)
        })?;

        let bytes = Rc::try_unwrap(composed.bytes).unwrap_or_else(|shared| (*shared).clone());
        info!(
            "Report for {} finished: {} page(s), {} bytes, {} warning(s)",
            data.municipality,
            composed.pages,
            bytes.len(),
            composed.warnings.len()
        );
        Ok(GeneratedReport {
            bytes,
            pages: composed.pages,
            placements: composed.placements,
            warnings: composed.warnings,
            resources: composed.resources,
            compliance: data.compliance,
        })
    }

    fn prepare(&self, input: &ReportInput) -> ReportData {
        let records = input.sorted_records();
        let periods = input.covered_periods();
        let generated_at = input
            .generated_at
            .unwrap_or_else(|| Local::now().naive_local());
        let compliance = analyze(&records, &periods, generated_at.date(), &self.config.compliance);
        ReportData {
            municipality: input.municipality.clone(),
            region: input.region.clone(),
            periods,
            records,
            compliance,
            generated_at,
        }
    }
}

fn pipeline() -> Vec<Box<dyn Section>> {
    vec![
        Box::new(HeaderSection),
        Box::new(IndicatorsSection),
        Box::new(ChartSection::comparative()),
        Box::new(ChartSection::personnel()),
        Box::new(MonthlySummarySection),
        Box::new(CompliancePanelSection),
    ]
}

struct Composed {
    bytes: Rc<Vec<u8>>,
    pages: u32,
    placements: Vec<PlacedElement>,
    warnings: Vec<SectionFailure>,
    resources: BTreeMap<ResourceKind, usize>,
}

/// Per-call drawing state.
struct Composer<'a> {
    generator: &'a ReportGenerator,
    data: &'a ReportData,
    surface: &'a mut dyn DrawingSurface,
    scope: &'a mut ResourceScope,
    cursor: LayoutCursor,
    placements: Vec<PlacedElement>,
    warnings: Vec<SectionFailure>,
}

impl Composer<'_> {
    fn run(mut self) -> Result<Composed, ReportError> {
        for section in pipeline() {
            self.place(section.as_ref())?;
        }

        self.close_page()?;
        let bytes = self
            .surface
            .finish()
            .map_err(|e| ReportError::generation(Phase::Finalize, e))?;
        let bytes = self.scope.track(bytes, ResourceKind::ByteBuffer, "pdf output");
        Ok(Composed {
            bytes,
            pages: self.cursor.page_number(),
            resources: self.scope.summary(),
            placements: self.placements,
            warnings: self.warnings,
        })
    }

    fn context(&mut self) -> DrawContext<'_> {
        DrawContext {
            surface: &mut *self.surface,
            scope: &mut *self.scope,
            cursor: &self.cursor,
            data: self.data,
            config: &self.generator.config,
            rasterizer: &self.generator.rasterizer,
            assets: self.generator.assets.as_deref(),
        }
    }

    fn place(&mut self, section: &dyn Section) -> Result<(), ReportError> {
        let config = &self.generator.config;
        let phase = section.phase();
        let height = section.height(self.data, config);
        let clearance = section.clearance(config);

        match self.cursor.safe_position(height + clearance, 0.0) {
            Ok(placement) => {
                let area = self.open_area(placement, height)?;
                self.draw_section(section, area)
            }
            Err(e) if phase.is_structural() => Err(ReportError::generation(phase, e)),
            Err(e) if phase == Phase::CompliancePanel => Err(e.into()),
            Err(e) => {
                let placement = self.cursor.safe_position(FAILURE_PLACEHOLDER_HEIGHT, 0.0)?;
                let area = self.open_area(placement, FAILURE_PLACEHOLDER_HEIGHT)?;
                self.fail_section(section, area, e.to_string())
            }
        }
    }

    /// Breaks the page first when the placement asks for it.
    fn open_area(&mut self, placement: Placement, height: f32) -> Result<Rect, ReportError> {
        if placement.needs_new_page {
            self.break_page()?;
        }
        let page = &self.generator.config.page;
        debug!(
            "Area for block of height {:.1} at y={:.1} on page {}",
            height,
            placement.y,
            self.cursor.page_number()
        );
        Ok(Rect::new(page.margin, placement.y - height, page.content_width(), height))
    }

    fn draw_section(&mut self, section: &dyn Section, area: Rect) -> Result<(), ReportError> {
        let phase = section.phase();
        let outcome = section.draw(&mut self.context(), area);
        match outcome {
            Ok(Drawn::Complete) => self.commit(section, area, section.kind()),
            Ok(Drawn::Degraded(reason)) => {
                self.record(phase, reason);
                self.commit(section, area, section.kind())
            }
            Err(SectionError::Chart(e)) => Err(ReportError::ChartConversion(e)),
            Err(e) if phase.is_structural() => Err(ReportError::generation(phase, e)),
            Err(e) => self.fail_section(section, area, e.to_string()),
        }
    }

    fn fail_section(&mut self, section: &dyn Section, area: Rect, message: String) -> Result<(), ReportError> {
        let phase = section.phase();
        warn!(
            "Section '{}' failed on page {}: {}; drawing placeholder",
            section.title(),
            self.cursor.page_number(),
            message
        );
        self.record(phase, message);
        self.context()
            .failure_placeholder(area, section.title())
            .map_err(|e| ReportError::generation(phase, e))?;
        self.commit(section, area, ElementKind::Placeholder)
    }

    fn commit(&mut self, section: &dyn Section, area: Rect, kind: ElementKind) -> Result<(), ReportError> {
        let bounds = self
            .cursor
            .register_element(section.title(), area.x, area.y, area.width, area.height)?;
        self.placements.push(PlacedElement::new(
            section.title(),
            kind,
            self.cursor.page_number(),
            bounds,
        ));
        self.cursor
            .advance(area.height, self.generator.config.page.spacing.small);
        Ok(())
    }

    fn record(&mut self, phase: Phase, message: String) {
        self.warnings.push(SectionFailure {
            phase,
            page: self.cursor.page_number(),
            message,
        });
    }

    fn close_page(&mut self) -> Result<(), ReportError> {
        let page = self.cursor.page_number();
        let footer = draw_footer(&mut *self.surface, &self.generator.config, page)
            .map_err(|e| ReportError::generation(Phase::Footer, e))?;
        self.placements.push(footer);
        Ok(())
    }

    fn break_page(&mut self) -> Result<(), ReportError> {
        self.close_page()?;
        self.surface
            .begin_page()
            .map_err(|e| ReportError::generation(Phase::Pagination, e))?;
        self.cursor.start_new_page();
        Ok(())
    }
}
