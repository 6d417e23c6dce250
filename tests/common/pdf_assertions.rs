use lopdf::Document as LopdfDocument;
use lopdf::content::{Content, Operation};

/// Text operands of every `Tj` on one page, decoded as WinAnsi/Latin-1.
pub fn page_text(doc: &LopdfDocument, page_num: u32) -> Vec<String> {
    let Some(page_id) = doc.get_pages().get(&page_num).copied() else {
        return Vec::new();
    };
    let Ok(raw) = doc.get_page_content(page_id) else {
        return Vec::new();
    };
    let Ok(content) = Content::decode(&raw) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|operand| operand.as_str().ok())
        .map(|bytes| bytes.iter().map(|&b| b as char).collect())
        .collect()
}

/// Content stream operations of one page, in drawing order.
pub fn page_operations(doc: &LopdfDocument, page_num: u32) -> Vec<Operation> {
    doc.get_pages()
        .get(&page_num)
        .and_then(|&page_id| doc.get_page_content(page_id).ok())
        .and_then(|raw| Content::decode(&raw).ok())
        .map(|content| content.operations)
        .unwrap_or_default()
}

/// Position of the first `re` operation matching `(x, y, w, h)` within 0.01pt.
pub fn find_rect(operations: &[Operation], bounds: (f32, f32, f32, f32)) -> Option<usize> {
    let expected = [bounds.0, bounds.1, bounds.2, bounds.3];
    operations.iter().position(|op| {
        op.operator == "re"
            && op.operands.len() == 4
            && op
                .operands
                .iter()
                .zip(expected)
                .all(|(operand, value)| operand.as_float().map(|v| (v - value).abs() < 0.01).unwrap_or(false))
    })
}

/// Extract all text content from a PDF document, one line per text operation
pub fn extract_text(doc: &LopdfDocument) -> String {
    let pages = doc.get_pages().len() as u32;
    (1..=pages)
        .flat_map(|page| page_text(doc, page))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of image XObjects referenced from page resources
pub fn count_images(doc: &LopdfDocument) -> usize {
    doc.objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false)
        })
        .count()
}

/// Assert that PDF contains specific text
#[macro_export]
macro_rules! assert_pdf_contains_text {
    ($pdf:expr, $text:expr) => {
        let extracted = $crate::common::pdf_assertions::extract_text(&$pdf.doc);
        assert!(
            extracted.contains($text),
            "PDF should contain '{}', but extracted text was:\n{}",
            $text,
            extracted
        );
    };
}

/// Assert that PDF does NOT contain specific text
#[macro_export]
macro_rules! assert_pdf_not_contains_text {
    ($pdf:expr, $text:expr) => {
        let extracted = $crate::common::pdf_assertions::extract_text(&$pdf.doc);
        assert!(
            !extracted.contains($text),
            "PDF should NOT contain '{}', but it was found in:\n{}",
            $text,
            extracted
        );
    };
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}
