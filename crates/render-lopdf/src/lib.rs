//! PDF drawing surface backed by lopdf.
//!
//! [`LopdfSurface`] keeps the whole document in memory and writes it out in
//! one pass when finished.

mod page;
mod renderer;

pub use renderer::LopdfSurface;
