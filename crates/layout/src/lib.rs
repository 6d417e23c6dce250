use acs_report_types::DataValidationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Element needs {required:.2} of height which exceeds the total page content height of {available:.2}.")]
    ElementTooLarge { required: f32, available: f32 },
    #[error("Element has a width of {width:.2} which exceeds the content width of {available:.2}.")]
    TooWide { width: f32, available: f32 },
    #[error("Invalid element geometry: {0}")]
    Geometry(#[from] DataValidationError),
}

pub mod config;
pub mod cursor;
pub mod metrics;
pub mod validator;

pub use self::config::{FontSizes, PageConfig, Palette, SpacingScale};
pub use self::cursor::{Alignment, LayoutCursor, LayoutStats, Placement, Slot};
pub use self::metrics::{text_width, wrap_text, wrap_text_limited};
pub use self::validator::{ElementKind, LayoutValidator, PlacedElement, ValidationReport};
