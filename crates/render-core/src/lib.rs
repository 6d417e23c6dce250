//! Core rendering abstractions for the ACS report engine.
//!
//! - [`DrawingSurface`]: the explicit surface handle sections draw onto
//! - [`RenderError`]: failures raised by surfaces
//! - Value types for paints, text styles and borrowed images

mod error;
mod traits;
mod types;
pub mod utils;

pub use error::RenderError;
pub use traits::DrawingSurface;
pub use types::{ImageRef, Paint, Stroke, TextStyle};
