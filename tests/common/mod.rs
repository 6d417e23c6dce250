#![allow(dead_code)]

pub mod fixtures;
pub mod pdf_assertions;
pub mod surfaces;

use acs_report::{GeneratedReport, ReportConfig, ReportError, ReportGenerator, ReportInput};
use lopdf::Document as LopdfDocument;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Generates with the default configuration and parses the result.
pub fn generate(input: &ReportInput) -> Result<(GeneratedReport, GeneratedPdf), Box<dyn std::error::Error>> {
    generate_with_config(input, ReportConfig::default())
}

pub fn generate_with_config(
    input: &ReportInput,
    config: ReportConfig,
) -> Result<(GeneratedReport, GeneratedPdf), Box<dyn std::error::Error>> {
    let report = ReportGenerator::new(config)?.generate(input)?;
    let pdf = GeneratedPdf::from_bytes(report.bytes.clone())?;
    Ok((report, pdf))
}

pub fn generate_err(input: &ReportInput, generator: &ReportGenerator) -> ReportError {
    match generator.generate(input) {
        Ok(report) => panic!("expected generation to fail, got {} page(s)", report.pages),
        Err(e) => e,
    }
}
