use crate::config::ReportConfig;
use acs_report_layout::metrics::text_width;
use acs_report_layout::{ElementKind, PlacedElement};
use acs_report_render_core::{DrawingSurface, RenderError, TextStyle};
use acs_report_types::{BoundingBox, Color};

const FOOTER_SIZE: f32 = 8.0;
const FOOTER_OFFSET: f32 = 20.0;
const FOOTER_GRAY: Color = Color::rgb(0x66, 0x66, 0x66);

/// Draws the copyright line and page number at the bottom of the current page.
pub(crate) fn draw_footer(
    surface: &mut dyn DrawingSurface,
    config: &ReportConfig,
    page: u32,
) -> Result<PlacedElement, RenderError> {
    let layout = &config.page;
    let baseline = layout.margin + FOOTER_OFFSET;
    let style = TextStyle::regular(FOOTER_SIZE).with_color(FOOTER_GRAY);
    surface.draw_text(layout.margin, baseline, &config.footer_text, style)?;

    let number = format!("Página {page}");
    let number_x = layout.page_width - layout.margin - text_width(&number, style.font, style.size);
    surface.draw_text(number_x, baseline, &number, style)?;

    let bounds = BoundingBox::from_xywh(layout.margin, baseline - 8.0, layout.content_width(), 16.0)
        .map_err(|e| RenderError::InvalidOperation(e.to_string()))?;
    Ok(PlacedElement::new(format!("footer p{page}"), ElementKind::Footer, page, bounds))
}
