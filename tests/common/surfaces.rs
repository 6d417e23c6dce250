use acs_report::{
    BackendError, ChartSpec, Color, DrawingSurface, ImageRef, LopdfSurface, Paint, RasterBackend, RasterImage,
    Rect, RenderError, TextStyle,
};

/// A real surface that fails selected operations on purpose.
pub struct FaultySurface {
    inner: LopdfSurface,
    fail_images: bool,
    fail_text: Option<String>,
    pub images_attempted: usize,
}

impl FaultySurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            inner: LopdfSurface::new(width, height).unwrap(),
            fail_images: false,
            fail_text: None,
            images_attempted: 0,
        }
    }

    pub fn a4() -> Self {
        Self::new(595.2756, 841.8898)
    }

    pub fn failing_images(mut self) -> Self {
        self.fail_images = true;
        self
    }

    /// Fails any `draw_text` whose text contains `needle`.
    pub fn failing_text(mut self, needle: impl Into<String>) -> Self {
        self.fail_text = Some(needle.into());
        self
    }
}

impl DrawingSurface for FaultySurface {
    fn page_size(&self) -> (f32, f32) {
        self.inner.page_size()
    }

    fn page_number(&self) -> u32 {
        self.inner.page_number()
    }

    fn begin_page(&mut self) -> Result<(), RenderError> {
        self.inner.begin_page()
    }

    fn draw_rect(&mut self, rect: Rect, paint: Paint) -> Result<(), RenderError> {
        self.inner.draw_rect(rect, paint)
    }

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, paint: Paint) -> Result<(), RenderError> {
        self.inner.draw_rounded_rect(rect, radius, paint)
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) -> Result<(), RenderError> {
        self.inner.draw_line(from, to, color, width)
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) -> Result<(), RenderError> {
        if let Some(needle) = &self.fail_text
            && text.contains(needle.as_str())
        {
            return Err(RenderError::Other(format!("refusing to draw '{text}'")));
        }
        self.inner.draw_text(x, y, text, style)
    }

    fn draw_image(&mut self, image: ImageRef<'_>, bounds: Rect) -> Result<(), RenderError> {
        self.images_attempted += 1;
        if self.fail_images {
            return Err(RenderError::InvalidOperation("image support disabled".into()));
        }
        self.inner.draw_image(image, bounds)
    }

    fn finish(&mut self) -> Result<Vec<u8>, RenderError> {
        self.inner.finish()
    }
}

/// A raster backend that behaves as if its dependency were missing.
#[derive(Debug)]
pub struct MissingBackend;

impl RasterBackend for MissingBackend {
    fn rasterize(&self, _spec: &ChartSpec, _scale: f32) -> Result<RasterImage, BackendError> {
        Err(BackendError::Unavailable("plotting library not installed".into()))
    }

    fn name(&self) -> &'static str {
        "missing"
    }
}

/// A raster backend whose every chart fails, but recoverably.
#[derive(Debug)]
pub struct FlakyBackend;

impl RasterBackend for FlakyBackend {
    fn rasterize(&self, _spec: &ChartSpec, _scale: f32) -> Result<RasterImage, BackendError> {
        Err(BackendError::Render("out of colors".into()))
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}
