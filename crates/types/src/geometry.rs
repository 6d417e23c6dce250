//! Page-space geometry.
//!
//! All coordinates are in points with the origin at the bottom-left corner of
//! the page and Y growing upward, which is the native PDF convention.

use crate::error::DataValidationError;
use serde::{Deserialize, Serialize};

/// An unvalidated drawing rectangle. `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Result<Self, DataValidationError> {
        if !x.is_finite() || x < 0.0 {
            return Err(DataValidationError::new(
                "position.x",
                format!("must be a finite value >= 0, got {x}"),
            ));
        }
        if !y.is_finite() || y < 0.0 {
            return Err(DataValidationError::new(
                "position.y",
                format!("must be a finite value >= 0, got {y}"),
            ));
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    width: f32,
    height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Result<Self, DataValidationError> {
        if !width.is_finite() || width <= 0.0 {
            return Err(DataValidationError::new(
                "dimensions.width",
                format!("must be a finite value > 0, got {width}"),
            ));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(DataValidationError::new(
                "dimensions.height",
                format!("must be a finite value > 0, got {height}"),
            ));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// A validated, axis-aligned box anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    position: Position,
    dimensions: Dimensions,
}

impl BoundingBox {
    pub fn new(position: Position, dimensions: Dimensions) -> Self {
        Self {
            position,
            dimensions,
        }
    }

    /// Validates raw coordinates and builds the box in one step.
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Result<Self, DataValidationError> {
        Ok(Self::new(Position::new(x, y)?, Dimensions::new(width, height)?))
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.dimensions.width
    }

    pub fn bottom(&self) -> f32 {
        self.position.y
    }

    pub fn top(&self) -> f32 {
        self.position.y + self.dimensions.height
    }

    pub fn width(&self) -> f32 {
        self.dimensions.width
    }

    pub fn height(&self) -> f32 {
        self.dimensions.height
    }

    pub fn area(&self) -> f32 {
        self.dimensions.area()
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.position.x + self.dimensions.width / 2.0,
            self.position.y + self.dimensions.height / 2.0,
        )
    }

    /// Edges are inclusive.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.left() <= x && x <= self.right() && self.bottom() <= y && y <= self.top()
    }

    /// Strict overlap test: boxes that merely share an edge do not overlap.
    pub fn overlaps_with(&self, other: &BoundingBox) -> bool {
        !(self.right() <= other.left()
            || other.right() <= self.left()
            || self.top() <= other.bottom()
            || other.top() <= self.bottom())
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let width = self.right().min(other.right()) - self.left().max(other.left());
        let height = self.top().min(other.top()) - self.bottom().max(other.bottom());
        if width <= 0.0 || height <= 0.0 {
            0.0
        } else {
            width * height
        }
    }

    /// Shortest edge-to-edge distance; zero when the boxes touch or overlap.
    pub fn gap_to(&self, other: &BoundingBox) -> f32 {
        let dx = (other.left() - self.right()).max(self.left() - other.right()).max(0.0);
        let dy = (other.bottom() - self.top()).max(self.bottom() - other.top()).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left(), self.bottom(), self.width(), self.height())
    }
}
