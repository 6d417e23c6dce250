//! In-memory PDF surface.
//!
//! Builds the document's object graph with `lopdf` as drawing happens and
//! serializes it on [`finish`](DrawingSurface::finish). Fonts are the standard
//! Helvetica pair, so nothing is embedded; images become RGB XObjects in a
//! resources dictionary shared by all pages.

use crate::page::PageContent;
use acs_report_render_core::{DrawingSurface, ImageRef, Paint, RenderError, TextStyle};
use acs_report_types::{Color, Font, Rect};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use log::debug;
use std::io::Write;

pub struct LopdfSurface {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    xobjects: Dictionary,
    page: PageContent,
    width: f32,
    height: f32,
    title: Option<String>,
    finished: bool,
}

impl std::fmt::Debug for LopdfSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pages", &self.page_number())
            .field("finished", &self.finished)
            .finish()
    }
}

impl LopdfSurface {
    pub fn new(width: f32, height: f32) -> Result<Self, RenderError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RenderError::InvalidOperation(format!(
                "page size must be positive, got {width}x{height}"
            )));
        }
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();

        Ok(Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            xobjects: Dictionary::new(),
            page: PageContent::new(),
            width,
            height,
            title: None,
            finished: false,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn ensure_open(&self) -> Result<(), RenderError> {
        if self.finished {
            Err(RenderError::Finished)
        } else {
            Ok(())
        }
    }

    fn check_rect(rect: &Rect) -> Result<(), RenderError> {
        let values = [rect.x, rect.y, rect.width, rect.height];
        if values.iter().any(|v| !v.is_finite()) || rect.width < 0.0 || rect.height < 0.0 {
            return Err(RenderError::InvalidOperation(format!(
                "invalid rectangle {:?}",
                rect
            )));
        }
        Ok(())
    }

    /// Writes the open page's content stream and page dictionary.
    fn close_page(&mut self) -> Result<(), RenderError> {
        let content = std::mem::take(&mut self.page).into_content();
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        debug!("Closed PDF page {}", self.page_ids.len());
        Ok(())
    }

    fn add_fonts(&mut self) -> Dictionary {
        let mut fonts = Dictionary::new();
        for font in [Font::Regular, Font::Bold] {
            let id = self.document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font_name(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), id);
        }
        fonts
    }

    fn add_info(&mut self) -> ObjectId {
        let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let mut info = dictionary! {
            "Producer" => Object::string_literal("acs-report"),
            "CreationDate" => Object::string_literal(created),
        };
        if let Some(title) = &self.title {
            info.set(
                "Title",
                Object::String(
                    acs_report_render_core::utils::to_win_ansi(title),
                    StringFormat::Literal,
                ),
            );
        }
        self.document.add_object(info)
    }
}

impl DrawingSurface for LopdfSurface {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn page_number(&self) -> u32 {
        self.page_ids.len() as u32 + u32::from(!self.finished)
    }

    fn begin_page(&mut self) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.close_page()
    }

    fn draw_rect(&mut self, rect: Rect, paint: Paint) -> Result<(), RenderError> {
        self.ensure_open()?;
        Self::check_rect(&rect)?;
        self.page.rect(rect, paint);
        Ok(())
    }

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, paint: Paint) -> Result<(), RenderError> {
        self.ensure_open()?;
        Self::check_rect(&rect)?;
        self.page.rounded_rect(rect, radius, paint);
        Ok(())
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) -> Result<(), RenderError> {
        self.ensure_open()?;
        if ![from.0, from.1, to.0, to.1, width].iter().all(|v| v.is_finite()) {
            return Err(RenderError::InvalidOperation(format!(
                "invalid line {:?} -> {:?}",
                from, to
            )));
        }
        self.page.line(from, to, color, width);
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) -> Result<(), RenderError> {
        self.ensure_open()?;
        if text.trim().is_empty() {
            return Ok(());
        }
        if !(x.is_finite() && y.is_finite() && style.size > 0.0) {
            return Err(RenderError::InvalidOperation(format!(
                "invalid text placement at ({x}, {y}) size {}",
                style.size
            )));
        }
        self.page.text(x, y, text, style);
        Ok(())
    }

    fn draw_image(&mut self, image: ImageRef<'_>, bounds: Rect) -> Result<(), RenderError> {
        self.ensure_open()?;
        Self::check_rect(&bounds)?;
        if !image.is_well_formed() {
            return Err(RenderError::InvalidOperation(format!(
                "image buffer of {} bytes does not match {}x{} RGB",
                image.rgb.len(),
                image.width,
                image.height
            )));
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(image.rgb)?;
        let compressed = encoder.finish()?;
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compressed,
        );
        let image_id = self.document.add_object(stream);
        let name = format!("Im{}", self.xobjects.len() + 1);
        self.xobjects.set(name.as_bytes().to_vec(), image_id);
        self.page.image(&name, bounds);
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, RenderError> {
        self.ensure_open()?;
        self.close_page()?;
        self.finished = true;

        let fonts = self.add_fonts();
        let resources = dictionary! {
            "Font" => fonts,
            "XObject" => std::mem::take(&mut self.xobjects),
        };
        self.document
            .objects
            .insert(self.resources_id, Object::Dictionary(resources));

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self
            .document
            .add_object(dictionary! { "Type" => "Catalog", "Pages" => self.pages_id });
        self.document.trailer.set("Root", catalog_id);
        let info_id = self.add_info();
        self.document.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        debug!(
            "Serialized PDF: {} page(s), {} bytes",
            self.page_ids.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Content;

    fn page_text(doc: &Document, page_id: ObjectId) -> Vec<String> {
        let raw = doc.get_page_content(page_id).unwrap();
        Content::decode(&raw)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first().and_then(|o| o.as_str().ok()).map(|b| b.iter().map(|&c| c as char).collect()))
            .collect()
    }

    #[test]
    fn test_single_page_document() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut surface = LopdfSurface::new(595.0, 842.0).unwrap().with_title("Relatório");
        surface
            .draw_text(40.0, 800.0, "Hello", TextStyle::regular(12.0))
            .unwrap();
        surface
            .draw_rect(Rect::new(40.0, 700.0, 100.0, 20.0), Paint::fill(Color::BLACK))
            .unwrap();
        let bytes = surface.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = pages[&1];
        assert_eq!(page_text(&doc, page_id), vec!["Hello"]);
    }

    #[test]
    fn test_begin_page_adds_pages() {
        let mut surface = LopdfSurface::new(300.0, 300.0).unwrap();
        assert_eq!(surface.page_number(), 1);
        surface.draw_text(10.0, 10.0, "one", TextStyle::regular(10.0)).unwrap();
        surface.begin_page().unwrap();
        assert_eq!(surface.page_number(), 2);
        surface.draw_text(10.0, 10.0, "two", TextStyle::bold(10.0)).unwrap();
        let bytes = surface.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(page_text(&doc, pages[&2]), vec!["two"]);
    }

    #[test]
    fn test_images_become_xobjects() {
        let mut surface = LopdfSurface::new(300.0, 300.0).unwrap();
        let pixels = vec![255u8; 2 * 2 * 3];
        surface
            .draw_image(ImageRef::new(2, 2, &pixels), Rect::new(10.0, 10.0, 50.0, 50.0))
            .unwrap();
        let bytes = surface.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let images = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| s.dict.get(b"Subtype").and_then(|v| v.as_name()).ok() == Some(&b"Image"[..]))
            .count();
        assert_eq!(images, 1);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let mut surface = LopdfSurface::new(300.0, 300.0).unwrap();
        let short = vec![0u8; 5];
        assert!(matches!(
            surface.draw_image(ImageRef::new(2, 2, &short), Rect::new(0.0, 0.0, 1.0, 1.0)),
            Err(RenderError::InvalidOperation(_))
        ));
        assert!(surface
            .draw_rect(Rect::new(f32::NAN, 0.0, 1.0, 1.0), Paint::fill(Color::BLACK))
            .is_err());
        assert!(LopdfSurface::new(0.0, 100.0).is_err());
    }

    #[test]
    fn test_drawing_after_finish_fails() {
        let mut surface = LopdfSurface::new(300.0, 300.0).unwrap();
        surface.finish().unwrap();
        assert!(matches!(surface.begin_page(), Err(RenderError::Finished)));
        assert!(matches!(surface.finish(), Err(RenderError::Finished)));
        assert!(matches!(
            surface.draw_text(0.0, 0.0, "late", TextStyle::regular(10.0)),
            Err(RenderError::Finished)
        ));
    }
}
