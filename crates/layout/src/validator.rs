//! Offline validation of a finished layout.
//!
//! The generator records every block it places; this module checks those
//! records after the fact for margin violations, overlaps, cramped spacing and
//! text too small to read. Nothing here runs during generation.

use crate::config::PageConfig;
use acs_report_types::BoundingBox;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_MIN_SPACING: f32 = 10.0;
pub const MIN_TEXT_HEIGHT: f32 = 12.0;
pub const MIN_TEXT_WIDTH: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Table,
    Chart,
    Image,
    Panel,
    Placeholder,
    Footer,
}

/// A block as it was placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedElement {
    pub name: String,
    pub kind: ElementKind,
    pub page: u32,
    pub bounds: BoundingBox,
}

impl PlacedElement {
    pub fn new(name: impl Into<String>, kind: ElementKind, page: u32, bounds: BoundingBox) -> Self {
        Self {
            name: name.into(),
            kind,
            page,
            bounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryViolation {
    pub element: String,
    pub page: u32,
    pub edge: Edge,
    /// How far past the margin the element reaches, in points.
    pub overflow: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapSeverity {
    Minor,
    Moderate,
    Major,
}

impl OverlapSeverity {
    /// Classifies by overlap area relative to the smaller element's area.
    pub fn classify(ratio: f32) -> Self {
        if ratio > 0.5 {
            OverlapSeverity::Major
        } else if ratio > 0.2 {
            OverlapSeverity::Moderate
        } else {
            OverlapSeverity::Minor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapIssue {
    pub first: String,
    pub second: String,
    pub page: u32,
    pub overlap_area: f32,
    pub overlap_ratio: f32,
    pub severity: OverlapSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpacingIssue {
    pub first: String,
    pub second: String,
    pub page: u32,
    pub gap: f32,
    pub required: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadabilityWarning {
    pub element: String,
    pub page: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub name: String,
    pub kind: ElementKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub total_elements: usize,
    pub total_errors: usize,
    pub pages_used: usize,
    pub validation_passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub boundary_violations: Vec<BoundaryViolation>,
    pub overlaps: Vec<OverlapIssue>,
    pub spacing_issues: Vec<SpacingIssue>,
    pub readability_warnings: Vec<ReadabilityWarning>,
    pub layout_map: BTreeMap<u32, Vec<MapEntry>>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone)]
pub struct LayoutValidator {
    page_width: f32,
    page_height: f32,
    margin: f32,
    min_spacing: f32,
    elements: Vec<PlacedElement>,
}

impl LayoutValidator {
    pub fn new(page_width: f32, page_height: f32, margin: f32) -> Self {
        Self {
            page_width,
            page_height,
            margin,
            min_spacing: DEFAULT_MIN_SPACING,
            elements: Vec::new(),
        }
    }

    pub fn for_page(config: &PageConfig) -> Self {
        Self::new(config.page_width, config.page_height, config.margin)
    }

    pub fn with_min_spacing(mut self, min_spacing: f32) -> Self {
        self.min_spacing = min_spacing;
        self
    }

    pub fn add(&mut self, element: PlacedElement) {
        self.elements.push(element);
    }

    pub fn extend<I: IntoIterator<Item = PlacedElement>>(&mut self, elements: I) {
        self.elements.extend(elements);
    }

    pub fn elements(&self) -> &[PlacedElement] {
        &self.elements
    }

    pub fn validate_boundaries(&self) -> Vec<BoundaryViolation> {
        let min_x = self.margin;
        let max_x = self.page_width - self.margin;
        let min_y = self.margin;
        let max_y = self.page_height - self.margin;

        let mut violations = Vec::new();
        for el in &self.elements {
            let b = &el.bounds;
            let checks = [
                (Edge::Left, min_x - b.left()),
                (Edge::Right, b.right() - max_x),
                (Edge::Bottom, min_y - b.bottom()),
                (Edge::Top, b.top() - max_y),
            ];
            for (edge, overflow) in checks {
                if overflow > 0.0 {
                    violations.push(BoundaryViolation {
                        element: el.name.clone(),
                        page: el.page,
                        edge,
                        overflow,
                    });
                }
            }
        }
        violations
    }

    pub fn detect_overlaps(&self) -> Vec<OverlapIssue> {
        self.same_page_pairs()
            .filter(|(a, b)| a.bounds.overlaps_with(&b.bounds))
            .map(|(a, b)| {
                let overlap_area = a.bounds.intersection_area(&b.bounds);
                let smaller = a.bounds.area().min(b.bounds.area());
                let overlap_ratio = if smaller > 0.0 { overlap_area / smaller } else { 0.0 };
                OverlapIssue {
                    first: a.name.clone(),
                    second: b.name.clone(),
                    page: a.page,
                    overlap_area,
                    overlap_ratio,
                    severity: OverlapSeverity::classify(overlap_ratio),
                }
            })
            .collect()
    }

    /// Non-overlapping neighbours closer than `min_spacing`, edge to edge.
    pub fn validate_spacing(&self, min_spacing: f32) -> Vec<SpacingIssue> {
        self.same_page_pairs()
            .filter(|(a, b)| !a.bounds.overlaps_with(&b.bounds))
            .filter_map(|(a, b)| {
                let gap = a.bounds.gap_to(&b.bounds);
                (gap < min_spacing).then(|| SpacingIssue {
                    first: a.name.clone(),
                    second: b.name.clone(),
                    page: a.page,
                    gap,
                    required: min_spacing,
                })
            })
            .collect()
    }

    pub fn validate_text_readability(&self) -> Vec<ReadabilityWarning> {
        let mut warnings = Vec::new();
        for el in self.elements.iter().filter(|e| e.kind == ElementKind::Text) {
            if el.bounds.height() < MIN_TEXT_HEIGHT {
                warnings.push(ReadabilityWarning {
                    element: el.name.clone(),
                    page: el.page,
                    reason: format!(
                        "height {:.1} is below the minimum of {:.1}",
                        el.bounds.height(),
                        MIN_TEXT_HEIGHT
                    ),
                });
            }
            if el.bounds.width() < MIN_TEXT_WIDTH {
                warnings.push(ReadabilityWarning {
                    element: el.name.clone(),
                    page: el.page,
                    reason: format!(
                        "width {:.1} is below the minimum of {:.1}",
                        el.bounds.width(),
                        MIN_TEXT_WIDTH
                    ),
                });
            }
        }
        warnings
    }

    /// Elements grouped by page, top of the page first.
    pub fn layout_map(&self) -> BTreeMap<u32, Vec<MapEntry>> {
        let mut map: BTreeMap<u32, Vec<MapEntry>> = BTreeMap::new();
        for el in &self.elements {
            map.entry(el.page).or_default().push(MapEntry {
                name: el.name.clone(),
                kind: el.kind,
                x: el.bounds.left(),
                y: el.bounds.bottom(),
                width: el.bounds.width(),
                height: el.bounds.height(),
            });
        }
        for entries in map.values_mut() {
            entries.sort_by(|a, b| (b.y + b.height).total_cmp(&(a.y + a.height)));
        }
        map
    }

    pub fn run_full_validation(&self) -> ValidationReport {
        let boundary_violations = self.validate_boundaries();
        let overlaps = self.detect_overlaps();
        let spacing_issues = self.validate_spacing(self.min_spacing);
        let readability_warnings = self.validate_text_readability();
        let pages: BTreeSet<u32> = self.elements.iter().map(|e| e.page).collect();

        let total_errors = boundary_violations.len() + overlaps.len() + spacing_issues.len();
        let summary = ValidationSummary {
            total_elements: self.elements.len(),
            total_errors,
            pages_used: pages.len(),
            validation_passed: total_errors == 0,
        };

        ValidationReport {
            boundary_violations,
            overlaps,
            spacing_issues,
            readability_warnings,
            layout_map: self.layout_map(),
            summary,
        }
    }

    fn same_page_pairs(&self) -> impl Iterator<Item = (&PlacedElement, &PlacedElement)> + '_ {
        self.elements.iter().enumerate().flat_map(move |(i, a)| {
            self.elements[i + 1..]
                .iter()
                .filter(move |b| b.page == a.page)
                .map(move |b| (a, b))
        })
    }
}
