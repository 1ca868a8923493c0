//! Platform abstraction traits
//!
//! These traits define the interface between the interlacer and the
//! platform it runs on: where glyph sets come from, what time it is, and
//! when to stop.

pub mod glyphs;
pub mod timing;

pub use glyphs::GlyphSource;
pub use timing::{Forever, Monotonic, StopSignal};
