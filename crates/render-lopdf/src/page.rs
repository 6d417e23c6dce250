//! Content-stream builder for a single page.

use acs_report_render_core::utils::to_win_ansi;
use acs_report_render_core::{Paint, TextStyle};
use acs_report_types::{Color, Rect};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

/// Bezier control offset for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

fn rgb_operands(color: Color) -> Vec<Object> {
    color.to_unit_rgb().into_iter().map(Object::from).collect()
}

/// Accumulates operations for the open page and skips redundant state changes.
#[derive(Debug, Default)]
pub(crate) struct PageContent {
    operations: Vec<Operation>,
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    line_width: Option<f32>,
}

impl PageContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_content(self) -> Content {
        Content {
            operations: self.operations,
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.fill_color != Some(color) {
            self.push("rg", rgb_operands(color));
            self.fill_color = Some(color);
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        if self.stroke_color != Some(color) {
            self.push("RG", rgb_operands(color));
            self.stroke_color = Some(color);
        }
    }

    fn set_line_width(&mut self, width: f32) {
        if self.line_width != Some(width) {
            self.push("w", vec![width.into()]);
            self.line_width = Some(width);
        }
    }

    /// Sets paint state and returns the painting operator, or `None` for an
    /// empty paint.
    fn apply_paint(&mut self, paint: Paint) -> Option<&'static str> {
        if let Some(fill) = paint.fill {
            self.set_fill_color(fill);
        }
        if let Some(stroke) = paint.stroke {
            self.set_stroke_color(stroke.color);
            self.set_line_width(stroke.width);
        }
        match (paint.fill.is_some(), paint.stroke.is_some()) {
            (true, true) => Some("B"),
            (true, false) => Some("f"),
            (false, true) => Some("S"),
            (false, false) => None,
        }
    }

    pub fn rect(&mut self, rect: Rect, paint: Paint) {
        let Some(op) = self.apply_paint(paint) else {
            return;
        };
        self.push(
            "re",
            vec![rect.x.into(), rect.y.into(), rect.width.into(), rect.height.into()],
        );
        self.push(op, vec![]);
    }

    pub fn rounded_rect(&mut self, rect: Rect, radius: f32, paint: Paint) {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        if r == 0.0 {
            self.rect(rect, paint);
            return;
        }
        let Some(op) = self.apply_paint(paint) else {
            return;
        };

        let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
        let k = r * KAPPA;
        let segments: [(&str, Vec<f32>); 9] = [
            ("m", vec![x + r, y]),
            ("l", vec![x + w - r, y]),
            ("c", vec![x + w - r + k, y, x + w, y + r - k, x + w, y + r]),
            ("l", vec![x + w, y + h - r]),
            ("c", vec![x + w, y + h - r + k, x + w - r + k, y + h, x + w - r, y + h]),
            ("l", vec![x + r, y + h]),
            ("c", vec![x + r - k, y + h, x, y + h - r + k, x, y + h - r]),
            ("l", vec![x, y + r]),
            ("c", vec![x, y + r - k, x + r - k, y, x + r, y]),
        ];
        for (operator, operands) in segments {
            self.push(operator, operands.into_iter().map(Object::from).collect());
        }
        self.push("h", vec![]);
        self.push(op, vec![]);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        self.set_stroke_color(color);
        self.set_line_width(width);
        self.push("m", vec![from.0.into(), from.1.into()]);
        self.push("l", vec![to.0.into(), to.1.into()]);
        self.push("S", vec![]);
    }

    pub fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) {
        self.push("BT", vec![]);
        self.push("Tf", vec![style.font.resource_name().into(), style.size.into()]);
        self.set_fill_color(style.color);
        self.push("Td", vec![x.into(), y.into()]);
        self.push(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        );
        self.push("ET", vec![]);
    }

    pub fn image(&mut self, name: &str, bounds: Rect) {
        self.push("q", vec![]);
        self.push(
            "cm",
            vec![
                bounds.width.into(),
                0.into(),
                0.into(),
                bounds.height.into(),
                bounds.x.into(),
                bounds.y.into(),
            ],
        );
        self.push("Do", vec![Object::Name(name.as_bytes().to_vec())]);
        self.push("Q", vec![]);
    }
}
