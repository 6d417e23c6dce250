use super::{DrawContext, Drawn, ReportData, Section};
use crate::config::ReportConfig;
use crate::error::{Phase, SectionError};
use crate::format::period_label;
use crate::record::PeriodRecord;
use acs_report_chart::{ChartSpec, LEGEND_SWATCH, PlotFrame, RasterSize, Series};
use acs_report_layout::ElementKind;
use acs_report_layout::metrics::text_width;
use acs_report_render_core::{ImageRef, TextStyle};
use acs_report_resource::ResourceKind;
use acs_report_types::{Color, DataValidationError, Font, Rect};
use log::{debug, warn};

const CHART_OFFSET: f32 = 25.0;
const NOTICE_WIDTH: f32 = 500.0;
const NOTICE_HEIGHT: f32 = 200.0;
const MIN_PERIODS: usize = 2;
const TITLE_SIZE: f32 = 10.0;
const TITLE_BASELINE: f32 = 14.0;
const LEGEND_SIZE: f32 = 8.0;
const AXIS_LABEL_SIZE: f32 = 7.0;
const AXIS_LABEL_DROP: f32 = 11.0;
const LABEL_PADDING: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartKind {
    Comparative,
    Personnel,
}

/// Grouped-bar comparison over the covered periods.
pub(crate) struct ChartSection {
    kind: ChartKind,
}

type Extract = fn(&PeriodRecord) -> f64;

fn expected(r: &PeriodRecord) -> f64 {
    r.expected_amount
}

fn received(r: &PeriodRecord) -> f64 {
    r.received_amount
}

fn credentialed(r: &PeriodRecord) -> f64 {
    r.credentialed_count as f64
}

fn paid(r: &PeriodRecord) -> f64 {
    r.paid_count as f64
}

impl ChartSection {
    pub const fn comparative() -> Self {
        Self {
            kind: ChartKind::Comparative,
        }
    }

    pub const fn personnel() -> Self {
        Self {
            kind: ChartKind::Personnel,
        }
    }

    fn chart_title(&self) -> &'static str {
        match self.kind {
            ChartKind::Comparative => "Comparação: Esperado vs Recebido",
            ChartKind::Personnel => "Comparação: Credenciados vs Pagos",
        }
    }

    fn series(&self) -> [(&'static str, Color, Extract); 2] {
        match self.kind {
            ChartKind::Comparative => [
                ("Valor Esperado", Color::rgb(0x00, 0x33, 0x66), expected as Extract),
                ("Valor Recebido", Color::rgb(0x2C, 0xA0, 0x2C), received),
            ],
            ChartKind::Personnel => [
                ("ACS Credenciados", Color::rgb(0x8C, 0x8C, 0x8C), credentialed as Extract),
                ("ACS Pagos", Color::rgb(0xFF, 0x7F, 0x0E), paid),
            ],
        }
    }

    fn build_spec(&self, records: &[PeriodRecord], size: RasterSize) -> Result<ChartSpec, DataValidationError> {
        if records.len() < MIN_PERIODS {
            return Err(DataValidationError::new(
                "records",
                format!("a chart needs at least {MIN_PERIODS} periods, got {}", records.len()),
            ));
        }
        let labels: Vec<String> = records.iter().map(|r| period_label(&r.period)).collect();
        let spec = self
            .series()
            .into_iter()
            .fold(ChartSpec::new(self.chart_title(), size), |spec, (name, color, value)| {
                let points = labels.iter().cloned().zip(records.iter().map(value)).collect();
                spec.with_series(Series::new(name, color, points))
            });
        Ok(spec)
    }

    /// Draws the title, legend names and period labels over the embedded
    /// chart, which occupies `chart` on the page.
    fn annotate(&self, ctx: &mut DrawContext<'_>, chart: Rect) -> Result<(), SectionError> {
        let frame = PlotFrame::new(ctx.rasterizer.margins(), chart.width, chart.height);
        let top = chart.top();
        let text = ctx.page().palette.text;

        let title = self.chart_title();
        let title_width = text_width(title, Font::Bold, TITLE_SIZE);
        ctx.surface.draw_text(
            chart.x + (chart.width - title_width) / 2.0,
            top - TITLE_BASELINE,
            title,
            TextStyle::new(Font::Bold, TITLE_SIZE, text),
        )?;

        let series = self.series();
        let legend_baseline = top - frame.legend_center() - LEGEND_SIZE * 0.35;
        for (index, (name, _, _)) in series.iter().enumerate() {
            let x = chart.x + frame.legend_x(index, series.len()) + LEGEND_SWATCH + LABEL_PADDING;
            ctx.surface
                .draw_text(x, legend_baseline, name, TextStyle::new(Font::Regular, LEGEND_SIZE, text))?;
        }

        let data = ctx.data;
        let labels: Vec<String> = data.records.iter().map(|r| period_label(&r.period)).collect();
        let stride = label_stride(&labels, frame.slot_width(labels.len()));
        if stride > 1 {
            debug!("{}: labelling every {} periods", self.title(), stride);
        }
        let style = TextStyle::new(Font::Regular, AXIS_LABEL_SIZE, text);
        let baseline = top - frame.bottom - AXIS_LABEL_DROP;
        for (index, label) in labels.iter().enumerate().step_by(stride) {
            let width = text_width(label, Font::Regular, AXIS_LABEL_SIZE);
            let center = chart.x + frame.slot_center(index, labels.len());
            ctx.surface.draw_text(center - width / 2.0, baseline, label, style)?;
        }
        Ok(())
    }

    fn chart_box(config: &ReportConfig) -> (f32, f32) {
        let width = config.chart.width.min(config.page.content_width());
        (width, config.chart.height)
    }

    fn has_enough_data(data: &ReportData) -> bool {
        data.records.len() >= MIN_PERIODS
    }
}

impl Section for ChartSection {
    fn phase(&self) -> Phase {
        match self.kind {
            ChartKind::Comparative => Phase::ComparativeChart,
            ChartKind::Personnel => Phase::PersonnelChart,
        }
    }

    fn title(&self) -> &'static str {
        match self.kind {
            ChartKind::Comparative => "Análise Comparativa",
            ChartKind::Personnel => "Análise de Pessoal",
        }
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Chart
    }

    fn height(&self, data: &ReportData, config: &ReportConfig) -> f32 {
        if Self::has_enough_data(data) {
            CHART_OFFSET + Self::chart_box(config).1
        } else {
            CHART_OFFSET + NOTICE_HEIGHT
        }
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<Drawn, SectionError> {
        ctx.section_title(area.top(), self.title())?;
        let top = area.top() - CHART_OFFSET;

        if !Self::has_enough_data(ctx.data) {
            let width = NOTICE_WIDTH.min(area.width);
            let x = ctx.cursor.centered_x(width)?;
            ctx.notice_box(
                Rect::new(x, top - NOTICE_HEIGHT, width, NOTICE_HEIGHT),
                "Dados insuficientes para gráfico comparativo",
            )?;
            return Ok(Drawn::Complete);
        }

        let (width, height) = Self::chart_box(ctx.config);
        let x = ctx.cursor.centered_x(width)?;
        let size = RasterSize::from_points(width, height, ctx.rasterizer.dpi())?;

        let spec = self
            .build_spec(&ctx.data.records, size)
            .map(|spec| ctx.scope.track(spec, ResourceKind::Generic, format!("{} spec", self.title())));
        let rendered =
            ctx.rasterizer
                .render_with_fallback(|| spec.map(|s| (*s).clone()), self.title(), size)?;
        let fallback = rendered.fallback_reason.clone();
        let image = ctx
            .scope
            .track(rendered.image, ResourceKind::RasterImage, format!("{} image", self.title()));

        let chart = Rect::new(x, top - height, width, height);
        ctx.surface.draw_image(
            ImageRef::new(image.width(), image.height(), image.as_rgb_bytes()),
            chart,
        )?;

        Ok(match fallback {
            Some(reason) => {
                warn!("{} drawn as placeholder: {}", self.title(), reason);
                Drawn::Degraded(reason)
            }
            None => {
                self.annotate(ctx, chart)?;
                Drawn::Complete
            }
        })
    }
}

/// Label every n-th category so neighbouring labels never collide.
fn label_stride(labels: &[String], slot_width: f32) -> usize {
    let widest = labels
        .iter()
        .map(|l| text_width(l, Font::Regular, AXIS_LABEL_SIZE))
        .fold(0.0, f32::max)
        + LABEL_PADDING;
    if slot_width <= 0.0 {
        return labels.len().max(1);
    }
    ((widest / slot_width).ceil() as usize).max(1)
}
