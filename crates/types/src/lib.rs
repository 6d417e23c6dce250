pub mod color;
pub mod error;
pub mod font;
pub mod geometry;

pub use color::Color;
pub use error::DataValidationError;
pub use font::Font;
pub use geometry::{BoundingBox, Dimensions, Position, Rect};
