mod common;

use acs_report::{
    ChartRasterizer, ElementKind, PeriodRecord, Phase, ReportConfig, ReportError, ReportGenerator, ReportInput,
};
use common::fixtures::*;
use common::pdf_assertions::{count_images, find_rect, page_operations};
use common::surfaces::{FaultySurface, FlakyBackend, MissingBackend};
use common::{GeneratedPdf, TestResult, generate_err, generate_with_config, init_logging};

fn generator() -> ReportGenerator {
    ReportGenerator::new(ReportConfig::default()).unwrap()
}

#[test]
fn test_chart_draw_failure_becomes_placeholder() -> TestResult {
    init_logging();
    let mut surface = FaultySurface::a4().failing_images();
    let report = generator().generate_with_surface(&anadia_input(), &mut surface)?;

    let phases: Vec<Phase> = report.warnings.iter().map(|w| w.phase).collect();
    assert_eq!(phases, vec![Phase::ComparativeChart, Phase::PersonnelChart]);
    assert_eq!(surface.images_attempted, 2);

    let placeholders: Vec<&str> = report
        .placements
        .iter()
        .filter(|p| p.kind == ElementKind::Placeholder)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(placeholders, vec!["Análise Comparativa", "Análise de Pessoal"]);

    let pdf = GeneratedPdf::from_bytes(report.bytes)?;
    assert_pdf_contains_text!(pdf, "Seção indisponível: Análise Comparativa");
    assert_pdf_contains_text!(pdf, "Seção indisponível: Análise de Pessoal");
    assert_pdf_contains_text!(pdf, "STATUS REGULATÓRIO E CONFORMIDADE");
    assert_eq!(count_images(&pdf.doc), 0);
    Ok(())
}

#[test]
fn test_panel_failure_keeps_document() -> TestResult {
    init_logging();
    let mut surface = FaultySurface::a4().failing_text("Resumo da Conformidade");
    let report = generator().generate_with_surface(&anadia_input(), &mut surface)?;

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].phase, Phase::CompliancePanel);
    assert!(report.warnings[0].message.contains("Resumo da Conformidade"));

    let pdf = GeneratedPdf::from_bytes(report.bytes)?;
    assert_pdf_contains_text!(pdf, "Seção indisponível: Status Regulatório");
    Ok(())
}

#[test]
fn test_failed_section_is_masked_before_placeholder() -> TestResult {
    init_logging();
    let mut surface = FaultySurface::a4().failing_text("Resumo da Conformidade");
    let report = generator().generate_with_surface(&anadia_input(), &mut surface)?;

    let placeholder = report
        .placements
        .iter()
        .find(|p| p.kind == ElementKind::Placeholder)
        .expect("panel placeholder");
    let bounds = &placeholder.bounds;
    let pdf = GeneratedPdf::from_bytes(report.bytes)?;
    let ops = page_operations(&pdf.doc, placeholder.page);

    let title = ops
        .iter()
        .position(|op| {
            op.operator == "Tj"
                && op.operands.first().and_then(|o| o.as_str().ok()).map(|b| b.starts_with(b"STATUS REGULAT")) == Some(true)
        })
        .expect("panel title drawn before the failure");
    let mask = find_rect(&ops, (bounds.left(), bounds.bottom(), bounds.width(), bounds.height()))
        .expect("mask over the reserved area");
    assert!(mask > title, "mask must cover what the panel already drew");
    assert_eq!(ops[mask + 1].operator, "f");
    Ok(())
}

#[test]
fn test_header_failure_aborts() {
    init_logging();
    let mut surface = FaultySurface::a4().failing_text("Município:");
    let err = generator()
        .generate_with_surface(&anadia_input(), &mut surface)
        .unwrap_err();

    assert!(
        matches!(err, ReportError::DocumentGeneration { phase: Phase::Header, .. }),
        "unexpected error: {err}"
    );
    assert!(err.to_string().starts_with("Document generation failed in header"));
}

#[test]
fn test_footer_failure_aborts() {
    init_logging();
    let mut surface = FaultySurface::a4().failing_text("Página");
    let err = generator()
        .generate_with_surface(&anadia_input(), &mut surface)
        .unwrap_err();

    assert!(matches!(err, ReportError::DocumentGeneration { phase: Phase::Footer, .. }));
}

#[test]
fn test_missing_chart_backend_is_fatal() {
    init_logging();
    let generator = generator().with_rasterizer(ChartRasterizer::with_backend(MissingBackend, 150.0));
    let err = generate_err(&anadia_input(), &generator);

    match err {
        ReportError::ChartConversion(e) => {
            assert_eq!(e.chart, "Análise Comparativa");
            assert!(e.message.contains("plotting library not installed"));
        }
        other => panic!("expected a chart conversion error, got {other}"),
    }
}

#[test]
fn test_recoverable_backend_failure_draws_placeholder_images() -> TestResult {
    init_logging();
    let generator = generator().with_rasterizer(ChartRasterizer::with_backend(FlakyBackend, 150.0));
    let report = generator.generate(&anadia_input())?;

    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings.iter().all(|w| w.message.contains("out of colors")));
    let charts = report
        .placements
        .iter()
        .filter(|p| p.kind == ElementKind::Chart)
        .count();
    assert_eq!(charts, 2);

    let pdf = GeneratedPdf::from_bytes(report.bytes)?;
    assert_eq!(count_images(&pdf.doc), 2);
    Ok(())
}

#[test]
fn test_narrow_page_replaces_tables() -> TestResult {
    init_logging();
    let mut config = ReportConfig::default();
    config.page.page_width = 380.0;
    let (report, pdf) = generate_with_config(&anadia_input(), config)?;

    let phases: Vec<Phase> = report.warnings.iter().map(|w| w.phase).collect();
    assert_eq!(phases, vec![Phase::Indicators, Phase::MonthlySummary]);
    assert_pdf_contains_text!(pdf, "Seção indisponível: Indicadores Principais");
    assert_pdf_contains_text!(pdf, "Seção indisponível: Resumo Detalhado por Mês");
    assert_eq!(count_images(&pdf.doc), 2);
    Ok(())
}

#[test]
fn test_oversized_table_is_replaced() -> TestResult {
    init_logging();
    let records = (0..40)
        .map(|i| {
            let period = format!("{}{:02}", 2022 + i / 12, i % 12 + 1);
            PeriodRecord::new(period, 12_000.0, 11_800.0, 44, 43)
        })
        .collect();
    let input = ReportInput::new("Anadia", "AL", records).with_generated_at(report_date());
    let (report, pdf) = generate_with_config(&input, ReportConfig::default())?;

    let summary = report
        .warnings
        .iter()
        .find(|w| w.phase == Phase::MonthlySummary)
        .expect("summary warning");
    assert!(summary.message.contains("exceeds"));
    assert_pdf_contains_text!(pdf, "Seção indisponível: Resumo Detalhado por Mês");
    assert_pdf_contains_text!(pdf, "STATUS REGULATÓRIO E CONFORMIDADE");
    Ok(())
}

#[test]
fn test_invalid_input_is_rejected_before_drawing() {
    init_logging();
    let mut surface = FaultySurface::a4();
    let input = ReportInput::new("Anadia", "AL", Vec::new());
    let err = generator()
        .generate_with_surface(&input, &mut surface)
        .unwrap_err();

    match err {
        ReportError::DataValidation(e) => assert_eq!(e.field, "records"),
        other => panic!("expected a validation error, got {other}"),
    }
}
