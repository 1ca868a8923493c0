//! Glyph source trait
//!
//! The driver never holds a whole snapshot of the store. Each glyph is read
//! right before it is uploaded, so a composer writing concurrently may be
//! observed mid-update (a torn set shows for one frame).

use graphyte_protocol::{Glyph, GlyphStore};

/// Something the interlacer can read glyph rows from
pub trait GlyphSource {
    /// Read one glyph of a set
    ///
    /// - `set`: glyph set (0-3)
    /// - `glyph`: CGRAM slot (0-7)
    fn read_glyph(&self, set: usize, glyph: usize) -> Glyph;
}

impl GlyphSource for GlyphStore {
    fn read_glyph(&self, set: usize, glyph: usize) -> Glyph {
        *self.glyph(set, glyph)
    }
}

impl<T: GlyphSource + ?Sized> GlyphSource for &T {
    fn read_glyph(&self, set: usize, glyph: usize) -> Glyph {
        (**self).read_glyph(set, glyph)
    }
}
