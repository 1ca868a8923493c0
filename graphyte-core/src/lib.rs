//! Board-agnostic composition logic for the Graphyte LCD
//!
//! Everything between "draw a circle" and "bytes in the glyph store":
//!
//! - 80x16 framebuffer with set/invert drawing modes
//! - Raster primitives (lines, rectangles, circles)
//! - Codec between the framebuffer and the four glyph sets
//! - Bitmap font table, text placement and scrolling
//! - Interlace frame plan used by the driver
//! - Platform traits (glyph source, clock, stop signal)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod codec;
pub mod font;
pub mod framebuffer;
pub mod interlace;
pub mod raster;
pub mod text;
pub mod traits;

pub use codec::{cell_address, cell_position, decode, encode, CellAddress};
pub use font::{FontError, FontTable};
pub use framebuffer::{DrawMode, Framebuffer, HEIGHT, WIDTH};
pub use interlace::{InterlaceState, Spacing};
pub use text::{Scroll, ScrollDirection, TextStrip};
pub use traits::{Forever, GlyphSource, Monotonic, StopSignal};
