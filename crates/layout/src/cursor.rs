//! The vertical layout cursor.
//!
//! Content flows top-down from `page_height - margin`. The cursor answers
//! "where does a block of this height go, and does it need a fresh page?"
//! without mutating anything; callers commit with [`LayoutCursor::advance`]
//! once the block is drawn.

use crate::LayoutError;
use crate::config::PageConfig;
use acs_report_types::{BoundingBox, DataValidationError, Rect};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub type CallbackError = Box<dyn std::error::Error>;
type PageStartCallback = Box<dyn FnMut(u32) -> Result<(), CallbackError>>;

/// Result of a placement query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top edge for the block (after `spacing_before`).
    pub y: f32,
    pub needs_new_page: bool,
}

/// A placement query that also resolved the horizontal position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub x: f32,
    pub y: f32,
    pub needs_new_page: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = DataValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(DataValidationError::new(
                "alignment",
                format!("expected one of left, center, right; got '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutStats {
    pub page_number: u32,
    pub current_y: f32,
    pub available_height: f32,
    pub elements_on_page: usize,
    pub total_elements: usize,
    pub content_width: f32,
    pub content_height: f32,
}

#[derive(Debug, Clone)]
struct PlacedBox {
    label: String,
    bounds: BoundingBox,
}

pub struct LayoutCursor {
    config: PageConfig,
    page_number: u32,
    current_y: f32,
    placed: Vec<PlacedBox>,
    total_elements: usize,
    callbacks: Vec<PageStartCallback>,
}

impl fmt::Debug for LayoutCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutCursor")
            .field("page_number", &self.page_number)
            .field("current_y", &self.current_y)
            .field("placed", &self.placed.len())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl LayoutCursor {
    pub fn new(config: PageConfig) -> Self {
        let current_y = config.top_y();
        Self {
            config,
            page_number: 1,
            current_y,
            placed: Vec::new(),
            total_elements: 0,
            callbacks: Vec::new(),
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn current_y(&self) -> f32 {
        self.current_y
    }

    /// Height left between the cursor and the footer zone.
    pub fn available_height(&self) -> f32 {
        (self.current_y - self.config.min_y()).max(0.0)
    }

    /// The page's content rectangle (inside margins, above the footer zone).
    pub fn content_area(&self) -> Rect {
        Rect::new(
            self.config.margin,
            self.config.min_y(),
            self.config.content_width(),
            self.config.content_height(),
        )
    }

    /// `(width, height)` still usable on the current page.
    pub fn remaining_space(&self) -> (f32, f32) {
        (self.config.content_width(), self.available_height())
    }

    /// Decides where a block of `height` goes. Never mutates the cursor.
    ///
    /// # Errors
    ///
    /// `LayoutError::ElementTooLarge` when the block plus its spacing cannot
    /// fit on any page.
    pub fn safe_position(&self, height: f32, spacing_before: f32) -> Result<Placement, LayoutError> {
        let required = height + spacing_before;
        let available = self.config.content_height();
        if required > available {
            return Err(LayoutError::ElementTooLarge {
                required,
                available,
            });
        }

        let top = self.current_y - spacing_before;
        if top - height >= self.config.min_y() {
            Ok(Placement {
                y: top,
                needs_new_page: false,
            })
        } else {
            debug!(
                "Block of height {:.1} does not fit at y={:.1} on page {}",
                height, self.current_y, self.page_number
            );
            Ok(Placement {
                y: self.config.top_y() - spacing_before,
                needs_new_page: true,
            })
        }
    }

    /// Same check as [`safe_position`](Self::safe_position). Blocks that can
    /// never fit also report `true`.
    pub fn needs_new_page(&self, height: f32, spacing_before: f32) -> bool {
        self.safe_position(height, spacing_before)
            .map(|p| p.needs_new_page)
            .unwrap_or(true)
    }

    /// Left edge for a block of `width` under the given alignment.
    pub fn aligned_x(&self, width: f32, alignment: Alignment) -> Result<f32, LayoutError> {
        let available = self.config.content_width();
        if width > available {
            return Err(LayoutError::TooWide { width, available });
        }
        let margin = self.config.margin;
        Ok(match alignment {
            Alignment::Left => margin,
            Alignment::Center => margin + (available - width) / 2.0,
            Alignment::Right => self.config.page_width - margin - width,
        })
    }

    pub fn centered_x(&self, width: f32) -> Result<f32, LayoutError> {
        self.aligned_x(width, Alignment::Center)
    }

    pub fn fits_within_content(&self, width: f32, height: f32) -> Result<(), LayoutError> {
        let available_width = self.config.content_width();
        if width > available_width {
            return Err(LayoutError::TooWide {
                width,
                available: available_width,
            });
        }
        let available_height = self.config.content_height();
        if height > available_height {
            return Err(LayoutError::ElementTooLarge {
                required: height,
                available: available_height,
            });
        }
        Ok(())
    }

    /// Resolves both coordinates for a block in one call.
    pub fn next_available_position(
        &self,
        width: f32,
        height: f32,
        alignment: Alignment,
        spacing_before: f32,
    ) -> Result<Slot, LayoutError> {
        let x = self.aligned_x(width, alignment)?;
        let placement = self.safe_position(height, spacing_before)?;
        Ok(Slot {
            x,
            y: placement.y,
            needs_new_page: placement.needs_new_page,
        })
    }

    /// Moves the cursor down past a block. Clamped at the footer zone.
    pub fn advance(&mut self, height: f32, spacing_after: f32) -> f32 {
        self.current_y = (self.current_y - height - spacing_after).max(self.config.min_y());
        self.current_y
    }

    /// Starts the next page and notifies page-start callbacks.
    ///
    /// Callback failures are logged; they never stop pagination.
    pub fn start_new_page(&mut self) -> f32 {
        self.page_number += 1;
        self.current_y = self.config.top_y();
        self.placed.clear();
        info!("Starting page {}", self.page_number);

        let page = self.page_number;
        for (index, callback) in self.callbacks.iter_mut().enumerate() {
            if let Err(e) = callback(page) {
                warn!("Page-start callback #{} failed on page {}: {}", index, page, e);
            }
        }
        self.current_y
    }

    pub fn on_page_start<F>(&mut self, callback: F)
    where
        F: FnMut(u32) -> Result<(), CallbackError> + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Records a placed block on the current page.
    pub fn register_element(
        &mut self,
        label: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<BoundingBox, LayoutError> {
        let bounds = BoundingBox::from_xywh(x, y, width, height)?;
        self.placed.push(PlacedBox {
            label: label.into(),
            bounds,
        });
        self.total_elements += 1;
        Ok(bounds)
    }

    /// `true` if the candidate box overlaps anything placed on this page.
    pub fn check_overlap(&self, x: f32, y: f32, width: f32, height: f32) -> Result<bool, LayoutError> {
        let candidate = BoundingBox::from_xywh(x, y, width, height)?;
        let hit = self.placed.iter().find(|p| p.bounds.overlaps_with(&candidate));
        if let Some(placed) = hit {
            debug!("Candidate box overlaps '{}'", placed.label);
        }
        Ok(hit.is_some())
    }

    pub fn stats(&self) -> LayoutStats {
        LayoutStats {
            page_number: self.page_number,
            current_y: self.current_y,
            available_height: self.available_height(),
            elements_on_page: self.placed.len(),
            total_elements: self.total_elements,
            content_width: self.config.content_width(),
            content_height: self.config.content_height(),
        }
    }

    /// Back to page one, top of page. Callbacks are kept.
    pub fn reset(&mut self) {
        self.page_number = 1;
        self.current_y = self.config.top_y();
        self.placed.clear();
        self.total_elements = 0;
    }
}
