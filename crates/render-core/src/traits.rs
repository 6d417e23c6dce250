use crate::error::RenderError;
use crate::types::{ImageRef, Paint, TextStyle};
use acs_report_types::{Color, Rect};

/// An explicit drawing target with absolute, bottom-left-origin coordinates.
///
/// The surface always has an open page: the first one exists from
/// construction, and [`begin_page`](DrawingSurface::begin_page) closes the
/// current page before opening the next.
pub trait DrawingSurface {
    /// `(width, height)` of every page, in points.
    fn page_size(&self) -> (f32, f32);

    /// One-based number of the page currently being drawn.
    fn page_number(&self) -> u32;

    fn begin_page(&mut self) -> Result<(), RenderError>;

    fn draw_rect(&mut self, rect: Rect, paint: Paint) -> Result<(), RenderError>;

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, paint: Paint) -> Result<(), RenderError>;

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) -> Result<(), RenderError>;

    /// Draws a single line of text with its baseline at `y`.
    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) -> Result<(), RenderError>;

    /// Scales the image into `bounds`.
    fn draw_image(&mut self, image: ImageRef<'_>, bounds: Rect) -> Result<(), RenderError>;

    /// Closes the last page and serializes the document.
    fn finish(&mut self) -> Result<Vec<u8>, RenderError>;
}
