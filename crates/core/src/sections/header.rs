use super::{DrawContext, Drawn, ReportData, Section};
use crate::config::ReportConfig;
use crate::error::{Phase, SectionError};
use crate::format::period_label;
use acs_report_chart::RasterImage;
use acs_report_layout::ElementKind;
use acs_report_layout::metrics::text_width;
use acs_report_render_core::{ImageRef, Paint, TextStyle};
use acs_report_resource::ResourceKind;
use acs_report_types::{Color, Font, Rect};
use log::{debug, info, warn};

const HEADER_HEIGHT: f32 = 150.0;
const TITLE_SIZE: f32 = 20.0;
const INFO_SIZE: f32 = 12.0;
const INFO_LEADING: f32 = 18.0;
const LOGO_HEIGHT: f32 = 60.0;
const LOGO_MAX_WIDTH: f32 = 120.0;
const GLYPH_WIDTH: f32 = 75.0;
const GLYPH_HEIGHT: f32 = 35.0;
const DARK_BLUE: Color = Color::rgb(0x00, 0x00, 0x8B);
const SEPARATOR_GRAY: Color = Color::rgb(0xCC, 0xCC, 0xCC);

pub(crate) struct HeaderSection;

/// Logo box that keeps the aspect ratio within the height and width limits.
fn logo_box(width_px: u32, height_px: u32) -> (f32, f32) {
    let aspect = width_px as f32 / height_px.max(1) as f32;
    let width = LOGO_HEIGHT * aspect;
    if width > LOGO_MAX_WIDTH {
        (LOGO_MAX_WIDTH, LOGO_MAX_WIDTH / aspect)
    } else {
        (width, LOGO_HEIGHT)
    }
}

fn period_range(periods: &[String]) -> String {
    match periods {
        [] => "N/A".to_string(),
        [only] => period_label(only),
        [first, .., last] => format!("{} a {}", period_label(first), period_label(last)),
    }
}

impl HeaderSection {
    /// Draws the logo, or the "ACS" glyph when none is available, and returns
    /// the width it took.
    fn draw_logo(&self, ctx: &mut DrawContext<'_>, top: f32) -> Result<f32, SectionError> {
        let x = ctx.page().margin;
        if let Some(logo) = self.load_logo(ctx) {
            let (width, height) = logo_box(logo.width(), logo.height());
            ctx.surface.draw_image(
                ImageRef::new(logo.width(), logo.height(), logo.as_rgb_bytes()),
                Rect::new(x, top - height, width, height),
            )?;
            return Ok(width);
        }

        let glyph = Rect::new(x, top - 5.0 - GLYPH_HEIGHT, GLYPH_WIDTH, GLYPH_HEIGHT);
        ctx.surface
            .draw_rect(glyph, Paint::fill_and_stroke(Color::WHITE, DARK_BLUE, 2.0))?;
        ctx.centered_text(
            glyph.x,
            glyph.width,
            glyph.y + glyph.height / 2.0,
            "ACS",
            TextStyle::new(Font::Bold, 12.0, DARK_BLUE),
        )?;
        Ok(GLYPH_WIDTH)
    }

    fn load_logo(&self, ctx: &mut DrawContext<'_>) -> Option<std::rc::Rc<RasterImage>> {
        let assets = ctx.assets?;
        let Some((path, bytes)) = assets.load_first(&ctx.config.logo_candidates) else {
            debug!("No logo found through {}", assets.name());
            return None;
        };
        let bytes = ctx.scope.track(bytes, ResourceKind::ByteBuffer, format!("logo bytes {path}"));
        match RasterImage::decode(&bytes) {
            Ok(image) => {
                info!("Logo loaded from {} ({}x{})", path, image.width(), image.height());
                Some(ctx.scope.track(image, ResourceKind::RasterImage, format!("logo {path}")))
            }
            Err(e) => {
                warn!("Logo {} could not be decoded: {}; using text glyph", path, e);
                None
            }
        }
    }
}

impl Section for HeaderSection {
    fn phase(&self) -> Phase {
        Phase::Header
    }

    fn title(&self) -> &'static str {
        "Cabeçalho"
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Text
    }

    fn height(&self, _data: &ReportData, _config: &ReportConfig) -> f32 {
        HEADER_HEIGHT
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<Drawn, SectionError> {
        let page = ctx.page().clone();
        let top = area.top();
        let logo_width = self.draw_logo(ctx, top)?;

        let blue = page.palette.dashboard_blue;
        let title = ctx.config.title.as_str();
        let title_width = text_width(title, Font::Bold, TITLE_SIZE);
        let title_x = ((page.page_width - title_width) / 2.0).max(page.margin + logo_width + 30.0);
        let baseline = top - 35.0;
        ctx.surface
            .draw_rect(Rect::new(title_x - 25.0, baseline - 2.0, 15.0, 8.0), Paint::fill(blue))?;
        ctx.surface
            .draw_text(title_x, baseline, title, TextStyle::new(Font::Bold, TITLE_SIZE, blue))?;

        let data = ctx.data;
        let info = [
            format!("Município: {}", data.municipality),
            format!("Estado: {}", data.region),
            format!("Período: {}", period_range(&data.periods)),
            format!("Data do Relatório: {}", data.generated_at.format("%d/%m/%Y %H:%M")),
        ];
        let info_x = page.margin + logo_width + 25.0;
        let style = TextStyle::new(Font::Regular, INFO_SIZE, page.palette.text);
        let mut y = baseline - 40.0;
        for line in &info {
            ctx.surface.draw_text(info_x, y, line, style)?;
            y -= INFO_LEADING;
        }

        let separator_y = area.y + 1.0;
        ctx.surface.draw_line(
            (page.margin, separator_y),
            (page.page_width - page.margin, separator_y),
            SEPARATOR_GRAY,
            1.0,
        )?;
        Ok(Drawn::Complete)
    }
}
