mod common;

use acs_report::{ElementKind, PageConfig, ReportConfig, ReportGenerator};
use common::fixtures::*;
use common::surfaces::FaultySurface;
use common::{TestResult, generate, generate_with_config, init_logging};

#[test]
fn test_default_report_passes_validation() -> TestResult {
    init_logging();
    let (report, _) = generate(&anadia_input())?;
    let validation = report.validate_layout(&PageConfig::default());

    assert!(validation.summary.validation_passed, "{}", validation.to_json()?);
    assert!(validation.readability_warnings.is_empty());
    assert_eq!(validation.summary.pages_used, 3);
    assert_eq!(validation.summary.total_elements, report.placements.len());
    Ok(())
}

#[test]
fn test_alert_report_passes_validation() -> TestResult {
    init_logging();
    let (report, _) = generate(&silent_tail_input(6))?;
    let validation = report.validate_layout(&PageConfig::default());
    assert!(validation.summary.validation_passed, "{}", validation.to_json()?);
    Ok(())
}

#[test]
fn test_degraded_report_passes_validation() -> TestResult {
    init_logging();
    let mut surface = FaultySurface::a4().failing_images();
    let report = ReportGenerator::new(ReportConfig::default())?.generate_with_surface(&anadia_input(), &mut surface)?;
    let validation = report.validate_layout(&PageConfig::default());
    assert!(validation.summary.validation_passed, "{}", validation.to_json()?);
    Ok(())
}

#[test]
fn test_sections_stay_above_footer_zone() -> TestResult {
    init_logging();
    let config = ReportConfig::default();
    let min_y = config.page.min_y();
    let (report, _) = generate_with_config(&anadia_input(), config)?;

    for placed in report.placements.iter().filter(|p| p.kind != ElementKind::Footer) {
        assert!(
            placed.bounds.bottom() >= min_y - 0.01,
            "{} reaches {:.1} on page {}",
            placed.name,
            placed.bounds.bottom(),
            placed.page
        );
    }
    Ok(())
}

#[test]
fn test_compliance_panel_keeps_safety_zone() -> TestResult {
    init_logging();
    let config = ReportConfig::default();
    let floor = config.page.margin + config.footer_safety_zone;
    let (report, _) = generate_with_config(&silent_tail_input(6), config)?;

    let panel = report
        .placements
        .iter()
        .find(|p| p.kind == ElementKind::Panel)
        .expect("panel placement");
    assert!(panel.bounds.bottom() >= floor - 0.01);
    Ok(())
}

#[test]
fn test_layout_map_orders_top_down() -> TestResult {
    init_logging();
    let (report, _) = generate(&anadia_input())?;
    let validation = report.validate_layout(&PageConfig::default());

    let first_page = &validation.layout_map[&1];
    assert_eq!(first_page[0].name, "Cabeçalho");
    assert_eq!(first_page.last().map(|e| e.kind), Some(ElementKind::Footer));
    Ok(())
}
