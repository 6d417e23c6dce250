//! Regulatory status panel: one card per criterion, a summary and, when the
//! trailing submission gap is long enough, the regulatory alert box.

use super::{DrawContext, Drawn, ReportData, Section};
use crate::compliance::{ComplianceFinding, ComplianceLevel, Severity};
use crate::config::ReportConfig;
use crate::error::{Phase, SectionError};
use crate::format::{compact_currency, period_label};
use acs_report_layout::metrics::{text_width, wrap_text_limited};
use acs_report_layout::ElementKind;
use acs_report_render_core::{Paint, TextStyle};
use acs_report_types::{Color, Font, Rect};

const PANEL_TITLE: &str = "STATUS REGULATÓRIO E CONFORMIDADE";
const MAX_RECOMMENDATIONS: usize = 3;
const CARD_GAP: f32 = 5.0;
const CARD_TEXT_X: f32 = 100.0;
const ALERT_BOX_HEIGHT: f32 = 120.0;

const DARK_BLUE: Color = Color::rgb(0x00, 0x00, 0x8B);
const DARK_GREEN: Color = Color::rgb(0x00, 0x64, 0x00);
const DARK_RED: Color = Color::rgb(0x8B, 0x00, 0x00);
const ALERT_RED: Color = Color::rgb(0xD3, 0x2F, 0x2F);
const ORANGE: Color = Color::rgb(0xF5, 0x7C, 0x00);
const MUTED: Color = Color::rgb(0x66, 0x66, 0x66);
const RULE_GRAY: Color = Color::rgb(0xCC, 0xCC, 0xCC);
const ALERT_FILL: Color = Color::rgb(0xFF, 0xF8, 0xE1);
const ALERT_STROKE: Color = Color::rgb(0xFF, 0xA7, 0x26);

/// One horizontal band of the panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Title,
    Card(usize),
    SummaryHeading,
    Rate,
    Level,
    RecommendationsHeading,
    Recommendation(usize),
    Provenance,
    Alert,
}

impl Row {
    fn height(self) -> f32 {
        match self {
            Row::Title => 40.0,
            Row::Card(_) => 45.0,
            Row::SummaryHeading => 25.0,
            Row::Rate => 15.0,
            Row::Level => 20.0,
            Row::RecommendationsHeading => 15.0,
            Row::Recommendation(_) => 12.0,
            Row::Provenance => 40.0,
            Row::Alert => ALERT_BOX_HEIGHT + 15.0,
        }
    }
}

fn rows(data: &ReportData) -> Vec<Row> {
    let report = &data.compliance;
    let mut rows = vec![Row::Title];
    rows.extend((0..report.findings.len()).map(Row::Card));
    rows.extend([Row::SummaryHeading, Row::Rate, Row::Level]);
    if report.level != ComplianceLevel::Excellent && !report.recommendations.is_empty() {
        rows.push(Row::RecommendationsHeading);
        let shown = report.recommendations.len().min(MAX_RECOMMENDATIONS);
        rows.extend((0..shown).map(Row::Recommendation));
    }
    rows.push(Row::Provenance);
    if report.alert.is_some() {
        rows.push(Row::Alert);
    }
    rows
}

fn level_color(level: ComplianceLevel) -> Color {
    match level {
        ComplianceLevel::Excellent => DARK_GREEN,
        ComplianceLevel::Good => ORANGE,
        ComplianceLevel::NeedsAttention => ALERT_RED,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => ALERT_RED,
        Severity::Medium => ORANGE,
        Severity::Low => Color::rgb(0x75, 0x75, 0x75),
    }
}

fn rate_label(rate: f64) -> String {
    format!("{rate:.1}%").replace('.', ",")
}

pub(crate) struct CompliancePanelSection;

impl CompliancePanelSection {
    fn draw_row(&self, ctx: &mut DrawContext<'_>, row: Row, top: f32) -> Result<(), SectionError> {
        let page = ctx.page().clone();
        let x = page.margin;
        let width = page.content_width();
        let data = ctx.data;
        let report = &data.compliance;

        match row {
            Row::Title => {
                let style = TextStyle::new(Font::Bold, 16.0, DARK_BLUE);
                let title_width = text_width(PANEL_TITLE, style.font, style.size);
                let title_x = ctx.cursor.centered_x(title_width).unwrap_or(x);
                let baseline = top - 20.0;
                ctx.surface.draw_text(title_x, baseline, PANEL_TITLE, style)?;
                ctx.surface.draw_line(
                    (title_x, baseline - 5.0),
                    (title_x + title_width, baseline - 5.0),
                    DARK_BLUE,
                    2.0,
                )?;
            }
            Row::Card(index) => {
                if let Some(finding) = report.findings.get(index) {
                    self.draw_card(ctx, finding, Rect::new(x, top - 40.0, width, 45.0 - CARD_GAP))?;
                }
            }
            Row::SummaryHeading => {
                ctx.surface.draw_text(
                    x,
                    top - 15.0,
                    "Resumo da Conformidade:",
                    TextStyle::new(Font::Bold, 12.0, DARK_BLUE),
                )?;
            }
            Row::Rate => {
                let line = format!(
                    "Taxa de Conformidade: {} ({}/{} itens)",
                    rate_label(report.compliance_rate),
                    report.compliant_count(),
                    report.findings.len()
                );
                ctx.surface
                    .draw_text(x, top - 11.0, &line, TextStyle::regular(10.0))?;
            }
            Row::Level => {
                let line = format!("Nível: {}", report.level);
                ctx.surface.draw_text(
                    x,
                    top - 13.0,
                    &line,
                    TextStyle::new(Font::Bold, 11.0, level_color(report.level)),
                )?;
            }
            Row::RecommendationsHeading => {
                ctx.surface
                    .draw_text(x, top - 11.0, "Recomendações:", TextStyle::bold(10.0))?;
            }
            Row::Recommendation(index) => {
                if let Some(text) = report.recommendations.get(index) {
                    ctx.surface.draw_text(
                        x + 10.0,
                        top - 9.0,
                        &format!("• {text}"),
                        TextStyle::regular(9.0),
                    )?;
                }
            }
            Row::Provenance => {
                ctx.surface
                    .draw_line((x, top - 10.0), (x + width, top - 10.0), RULE_GRAY, 1.0)?;
                let generated = data.generated_at;
                let stamp = format!(
                    "Status regulatório gerado automaticamente em {} às {}",
                    generated.format("%d/%m/%Y"),
                    generated.format("%H:%M")
                );
                let latest = report
                    .latest_period
                    .as_deref()
                    .map(period_label)
                    .unwrap_or_else(|| "N/A".to_string());
                let style = TextStyle::regular(8.0).with_color(MUTED);
                ctx.surface.draw_text(x, top - 22.0, &stamp, style)?;
                ctx.surface.draw_text(
                    x,
                    top - 34.0,
                    &format!("Baseado nos dados da competência {latest}"),
                    style,
                )?;
            }
            Row::Alert => {
                if let Some(alert) = &report.alert {
                    let area = Rect::new(x, top - 10.0 - ALERT_BOX_HEIGHT, width, ALERT_BOX_HEIGHT);
                    ctx.surface.draw_rounded_rect(
                        area,
                        5.0,
                        Paint::fill_and_stroke(ALERT_FILL, ALERT_STROKE, 2.0),
                    )?;
                    let inner_x = area.x + 15.0;
                    let inner_top = area.top();
                    ctx.surface.draw_text(
                        inner_x,
                        inner_top - 25.0,
                        "ALERTA REGULAMENTAR",
                        TextStyle::new(Font::Bold, 16.0, page.palette.dashboard_green),
                    )?;
                    let regulation = wrap_text_limited(&alert.regulation, width - 30.0, Font::Regular, 9.0, 1);
                    if let Some(line) = regulation.first() {
                        ctx.surface
                            .draw_text(inner_x, inner_top - 45.0, line, TextStyle::regular(9.0).with_color(MUTED))?;
                    }
                    let body = TextStyle::regular(10.0);
                    ctx.surface.draw_text(
                        inner_x,
                        inner_top - 63.0,
                        &format!(
                            "Observadas {} competências consecutivas sem envio de informação",
                            alert.consecutive_periods
                        ),
                        body,
                    )?;
                    ctx.surface
                        .draw_text(inner_x, inner_top - 77.0, "sobre a produção do SISAB.", body)?;
                    let loss = format!(
                        "PERDA APROXIMADA DE {}/MÊS",
                        compact_currency(alert.monthly_loss_estimate, false)
                    )
                    .to_uppercase();
                    ctx.surface.draw_text(
                        inner_x,
                        inner_top - 102.0,
                        &loss,
                        TextStyle::new(Font::Bold, 12.0, ALERT_RED),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn draw_card(&self, ctx: &mut DrawContext<'_>, finding: &ComplianceFinding, card: Rect) -> Result<(), SectionError> {
        let (fill, stroke) = if finding.compliant {
            (Color::from_unit(0.9, 0.95, 0.9), DARK_GREEN)
        } else {
            (Color::from_unit(0.95, 0.9, 0.9), DARK_RED)
        };
        ctx.surface
            .draw_rounded_rect(card, 3.0, Paint::fill_and_stroke(fill, stroke, 1.5))?;

        let middle = card.y + card.height / 2.0;
        let icon = Rect::new(card.x + 8.0, middle - 7.0, 14.0, 14.0);
        ctx.surface.draw_rounded_rect(icon, 7.0, Paint::fill(stroke))?;

        let status = if finding.compliant { "CONFORME" } else { "NÃO CONFORME" };
        let top = card.top();
        ctx.surface
            .draw_text(card.x + 28.0, top - 15.0, status, TextStyle::new(Font::Bold, 8.0, stroke))?;
        if !finding.compliant {
            let tag = format!("PRIORIDADE {}", finding.severity.label());
            ctx.surface.draw_text(
                card.x + 28.0,
                top - 28.0,
                &tag,
                TextStyle::new(Font::Bold, 7.0, severity_color(finding.severity)),
            )?;
        }

        let wrap_width = card.width - CARD_TEXT_X - 10.0;
        let lines = wrap_text_limited(&finding.description, wrap_width, Font::Regular, 9.0, 2);
        let mut baseline = top - 16.0;
        for line in &lines {
            ctx.surface
                .draw_text(card.x + CARD_TEXT_X, baseline, line, TextStyle::regular(9.0))?;
            baseline -= 12.0;
        }
        Ok(())
    }
}

impl Section for CompliancePanelSection {
    fn phase(&self) -> Phase {
        Phase::CompliancePanel
    }

    fn title(&self) -> &'static str {
        "Status Regulatório"
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Panel
    }

    fn height(&self, data: &ReportData, _config: &ReportConfig) -> f32 {
        rows(data).into_iter().map(Row::height).sum()
    }

    /// The panel keeps the footer safety zone free below it.
    fn clearance(&self, config: &ReportConfig) -> f32 {
        (config.page.margin + config.footer_safety_zone - config.page.min_y()).max(0.0)
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<Drawn, SectionError> {
        let mut top = area.top();
        for row in rows(ctx.data) {
            self.draw_row(ctx, row, top)?;
            top -= row.height();
        }
        Ok(Drawn::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::RegulatoryAlert;
    use crate::sections::test_support::sample_data;

    #[test]
    fn test_one_card_per_finding() {
        let data = sample_data(3);
        let rows = rows(&data);
        let cards = rows.iter().filter(|r| matches!(r, Row::Card(_))).count();
        assert_eq!(cards, data.compliance.findings.len());
        assert_eq!(rows.first(), Some(&Row::Title));
        assert!(!rows.contains(&Row::Alert));
    }

    #[test]
    fn test_height_matches_rows() {
        let data = sample_data(3);
        let config = ReportConfig::default();
        let expected: f32 = rows(&data).iter().map(|r| r.height()).sum();
        assert_eq!(CompliancePanelSection.height(&data, &config), expected);
    }

    #[test]
    fn test_alert_adds_box() {
        let mut data = sample_data(3);
        let config = ReportConfig::default();
        let without = CompliancePanelSection.height(&data, &config);
        data.compliance.alert = Some(RegulatoryAlert {
            consecutive_periods: 6,
            monthly_loss_estimate: 8_000.0,
            regulation: "Portaria GM/MS Nº 6.907, de 29 de abril de 2025".into(),
        });
        assert_eq!(CompliancePanelSection.height(&data, &config), without + 135.0);
        assert_eq!(rows(&data).last(), Some(&Row::Alert));
    }

    #[test]
    fn test_recommendations_are_capped() {
        let mut data = sample_data(3);
        data.compliance.level = ComplianceLevel::NeedsAttention;
        data.compliance.recommendations = (0..5).map(|i| format!("Ação {i}")).collect();
        let recs = rows(&data)
            .into_iter()
            .filter(|r| matches!(r, Row::Recommendation(_)))
            .count();
        assert_eq!(recs, MAX_RECOMMENDATIONS);

        data.compliance.level = ComplianceLevel::Excellent;
        assert!(!rows(&data).contains(&Row::RecommendationsHeading));
    }

    #[test]
    fn test_clearance_from_safety_zone() {
        let config = ReportConfig::default();
        assert_eq!(CompliancePanelSection.clearance(&config), 20.0);
    }

    #[test]
    fn test_rate_label() {
        assert_eq!(rate_label(80.0), "80,0%");
        assert_eq!(rate_label(66.666), "66,7%");
    }
}
