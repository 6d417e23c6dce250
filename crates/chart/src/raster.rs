use crate::spec::RasterSize;
use acs_report_types::Color;
use image::{DynamicImage, ImageError, Rgb, RgbImage};

/// An 8-bit RGB raster, ready to embed as a PDF image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn solid(size: RasterSize, color: Color) -> Self {
        Self {
            pixels: RgbImage::from_pixel(size.width, size.height, to_rgb(color)),
        }
    }

    /// Flattens any alpha channel onto a white background.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut pixels = RgbImage::new(width, height);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = a as f32 / 255.0;
            let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
            pixels.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
        }
        Self { pixels }
    }

    /// Decodes PNG or JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(&image))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn matches(&self, size: RasterSize) -> bool {
        self.size() == (size.width, size.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixels
            .get_pixel_checked(x, y)
            .map(|p| Color::rgb(p.0[0], p.0[1], p.0[2]))
    }

    /// Row-major RGB bytes, top row first.
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn into_inner(self) -> RgbImage {
        self.pixels
    }
}

pub(crate) fn to_rgb(color: Color) -> Rgb<u8> {
    Rgb([color.r, color.g, color.b])
}
