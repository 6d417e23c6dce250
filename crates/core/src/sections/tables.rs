use super::{DrawContext, Drawn, ReportData, Section};
use crate::config::ReportConfig;
use crate::error::{Phase, SectionError};
use crate::format::{compact_currency, currency, period_label, signed_amount, signed_count};
use acs_report_layout::ElementKind;
use acs_report_render_core::{Paint, TextStyle};
use acs_report_types::{Color, Font, Rect};

/// Gap between a section's top edge and its table.
const TABLE_OFFSET: f32 = 30.0;
const GRID_WIDTH: f32 = 0.5;

struct Table {
    widths: &'static [f32],
    /// First row is the header.
    rows: Vec<Vec<String>>,
    header_fill: Color,
    highlight_first_row: Option<Color>,
    font_size: f32,
}

impl Table {
    fn width(&self) -> f32 {
        self.widths.iter().sum()
    }

    fn height(rows: usize, config: &ReportConfig) -> f32 {
        config.page.table_header_height + rows.saturating_sub(1) as f32 * config.page.table_row_height
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, top: f32) -> Result<(), SectionError> {
        let x = ctx.cursor.centered_x(self.width())?;
        let page = ctx.page().clone();
        let mut y = top;

        for (index, row) in self.rows.iter().enumerate() {
            let header = index == 0;
            let height = if header {
                page.table_header_height
            } else {
                page.table_row_height
            };
            let fill = match (header, self.highlight_first_row) {
                (true, _) => self.header_fill,
                (false, Some(color)) if index == 1 => color,
                (false, _) => page.palette.background,
            };
            let style = if header {
                TextStyle::new(Font::Bold, self.font_size, Color::WHITE)
            } else {
                TextStyle::new(Font::Regular, self.font_size, page.palette.text)
            };

            let mut cell_x = x;
            for (cell, &width) in row.iter().zip(self.widths) {
                ctx.surface.draw_rect(
                    Rect::new(cell_x, y - height, width, height),
                    Paint::fill_and_stroke(fill, Color::BLACK, GRID_WIDTH),
                )?;
                ctx.centered_text(cell_x, width, y - height / 2.0, cell, style)?;
                cell_x += width;
            }
            y -= height;
        }
        Ok(())
    }
}

/// Latest period against the one before it.
pub(crate) struct IndicatorsSection;

impl IndicatorsSection {
    const WIDTHS: &'static [f32] = &[150.0, 100.0, 100.0];

    fn rows(data: &ReportData) -> Vec<Vec<String>> {
        let header = vec!["Métrica".to_string(), "Valor Atual".into(), "Variação Mensal".into()];
        let Some(latest) = data.latest() else {
            return vec![
                header,
                vec!["Valor Recebido (R$)".into(), "R$ 0,00".into(), "R$ 0,00".into()],
                vec!["ACS Pagos".into(), "0".into(), "0".into()],
                vec!["Valor Esperado (R$)".into(), "R$ 0,00".into(), "R$ 0,00".into()],
            ];
        };
        let (received_delta, paid_delta, expected_delta) = match data.previous() {
            Some(prev) => (
                latest.received_amount - prev.received_amount,
                latest.paid_count as i64 - prev.paid_count as i64,
                latest.expected_amount - prev.expected_amount,
            ),
            None => (0.0, 0, 0.0),
        };
        vec![
            header,
            vec![
                "Valor Recebido (R$)".into(),
                compact_currency(latest.received_amount, false),
                compact_currency(received_delta, true),
            ],
            vec![
                "ACS Pagos".into(),
                latest.paid_count.to_string(),
                signed_count(paid_delta),
            ],
            vec![
                "Valor Esperado (R$)".into(),
                compact_currency(latest.expected_amount, false),
                compact_currency(expected_delta, true),
            ],
        ]
    }
}

impl Section for IndicatorsSection {
    fn phase(&self) -> Phase {
        Phase::Indicators
    }

    fn title(&self) -> &'static str {
        "Indicadores Principais"
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Table
    }

    fn height(&self, _data: &ReportData, config: &ReportConfig) -> f32 {
        TABLE_OFFSET + Table::height(4, config)
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<Drawn, SectionError> {
        let table = Table {
            widths: Self::WIDTHS,
            rows: Self::rows(ctx.data),
            header_fill: ctx.page().palette.dashboard_blue,
            highlight_first_row: None,
            font_size: ctx.page().fonts.body,
        };
        ctx.section_title(area.top(), self.title())?;
        table.draw(ctx, area.top() - TABLE_OFFSET)?;
        Ok(Drawn::Complete)
    }
}

/// One row per period, most recent first.
pub(crate) struct MonthlySummarySection;

impl MonthlySummarySection {
    const WIDTHS: &'static [f32] = &[80.0, 120.0, 100.0, 80.0, 100.0];

    fn rows(data: &ReportData) -> Vec<Vec<String>> {
        let mut rows = vec![
            ["Mês/Ano", "Valor Recebido (R$)", "Variação (R$)", "ACS Pagos", "Variação ACS"]
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        ];
        let newest_first: Vec<_> = data.records.iter().rev().collect();
        for (index, record) in newest_first.iter().enumerate() {
            let (amount_delta, paid_delta) = match newest_first.get(index + 1) {
                Some(older) => (
                    record.received_amount - older.received_amount,
                    record.paid_count as i64 - older.paid_count as i64,
                ),
                None => (0.0, 0),
            };
            rows.push(vec![
                period_label(&record.period),
                currency(record.received_amount),
                signed_amount(amount_delta),
                record.paid_count.to_string(),
                signed_count(paid_delta),
            ]);
        }
        rows
    }
}

impl Section for MonthlySummarySection {
    fn phase(&self) -> Phase {
        Phase::MonthlySummary
    }

    fn title(&self) -> &'static str {
        "Resumo Detalhado por Mês"
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Table
    }

    fn height(&self, data: &ReportData, config: &ReportConfig) -> f32 {
        TABLE_OFFSET + Table::height(data.records.len() + 1, config)
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<Drawn, SectionError> {
        let palette = &ctx.page().palette;
        let table = Table {
            widths: Self::WIDTHS,
            rows: Self::rows(ctx.data),
            header_fill: palette.dashboard_green,
            highlight_first_row: Some(palette.light_green),
            font_size: 9.0,
        };
        ctx.section_title(area.top(), self.title())?;
        table.draw(ctx, area.top() - TABLE_OFFSET)?;
        Ok(Drawn::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::sample_data;

    #[test]
    fn test_indicator_rows_compare_last_two_periods() {
        let data = sample_data(3);
        let rows = IndicatorsSection::rows(&data);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], vec!["Valor Recebido (R$)", "R$ 11Mil", "R$ +100,00"]);
        assert_eq!(rows[2], vec!["ACS Pagos", "43", "+1"]);
        assert_eq!(rows[3][2], "R$ 0,00");
    }

    #[test]
    fn test_single_period_has_no_variation() {
        let data = sample_data(1);
        let rows = IndicatorsSection::rows(&data);
        assert_eq!(rows[1][2], "R$ 0,00");
        assert_eq!(rows[2][2], "0");
    }

    #[test]
    fn test_summary_rows_newest_first() {
        let data = sample_data(3);
        let rows = MonthlySummarySection::rows(&data);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1][0], "03/2025");
        assert_eq!(rows[1][1], "R$ 11.300,00");
        assert_eq!(rows[1][2], "+100,00");
        assert_eq!(rows[1][4], "+1");
        assert_eq!(rows[3][0], "01/2025");
        assert_eq!(rows[3][2], "+0,00");
        assert_eq!(rows[3][4], "0");
    }

    #[test]
    fn test_heights_follow_row_count() {
        let config = ReportConfig::default();
        let data = sample_data(3);
        assert_eq!(IndicatorsSection.height(&data, &config), 30.0 + 25.0 + 3.0 * 20.0);
        assert_eq!(MonthlySummarySection.height(&data, &config), 30.0 + 25.0 + 3.0 * 20.0);
    }
}
