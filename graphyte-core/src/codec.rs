//! Framebuffer <-> glyph store codec
//!
//! Each glyph covers a 5x8 pixel cell. Sets 0 and 1 cover the top 8 rows,
//! sets 2 and 3 the bottom 8; odd sets are shifted right by half a character
//! (5 columns). Glyph `g` sits 10 columns after glyph `g - 1` and the whole
//! row is rotated left by 10 columns:
//!
//! ```text
//! x = (glyph * 10 + col + (set odd ? 5 : 0) + 70) mod 80
//! y = row + (set >= 2 ? 8 : 0)
//! ```
//!
//! The mapping is a bijection between the 1280 framebuffer pixels and the
//! 1280 meaningful store bits, so `decode(encode(f)) == f` for every
//! framebuffer.

use graphyte_protocol::glyph::{
    GlyphStore, GLYPHS_PER_SET, GLYPH_COLUMNS, ROWS_PER_GLYPH, SET_COUNT,
};

use crate::framebuffer::{Framebuffer, WIDTH};

/// Horizontal distance between consecutive glyphs of one set
const GLYPH_PITCH: usize = 2 * GLYPH_COLUMNS;

/// Rotation applied to every column (`+70 mod 80`, i.e. one glyph left)
const ROTATION: usize = WIDTH - GLYPH_PITCH;

/// Location of one pixel inside the glyph store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CellAddress {
    /// Glyph set (0-3)
    pub set: usize,
    /// Glyph within the set (0-7)
    pub glyph: usize,
    /// Row within the glyph (0-7)
    pub row: usize,
    /// Column within the row (0 = leftmost, stored in bit 4)
    pub col: usize,
}

impl CellAddress {
    /// Bit mask of this column inside a row byte
    pub const fn bit(&self) -> u8 {
        1 << (GLYPH_COLUMNS - 1 - self.col)
    }
}

/// Framebuffer coordinate of a store cell
pub const fn cell_position(addr: CellAddress) -> (usize, usize) {
    let half = if addr.set % 2 == 1 { GLYPH_COLUMNS } else { 0 };
    let x = (addr.glyph * GLYPH_PITCH + addr.col + half + ROTATION) % WIDTH;
    let y = addr.row + if addr.set >= 2 { ROWS_PER_GLYPH } else { 0 };
    (x, y)
}

/// Store cell holding a framebuffer pixel
///
/// Returns `None` outside the 80x16 raster.
pub const fn cell_address(x: usize, y: usize) -> Option<CellAddress> {
    if x >= WIDTH || y >= 2 * ROWS_PER_GLYPH {
        return None;
    }
    // Undo the rotation, then split into glyph and half-glyph column
    let unrotated = (x + GLYPH_PITCH) % WIDTH;
    let within = unrotated % GLYPH_PITCH;
    let half = if within >= GLYPH_COLUMNS { 1 } else { 0 };

    Some(CellAddress {
        set: (y / ROWS_PER_GLYPH) * 2 + half,
        glyph: unrotated / GLYPH_PITCH,
        row: y % ROWS_PER_GLYPH,
        col: within % GLYPH_COLUMNS,
    })
}

/// Iterate over every cell of the store in set, glyph, row, column order
fn cells() -> impl Iterator<Item = CellAddress> {
    (0..SET_COUNT).flat_map(|set| {
        (0..GLYPHS_PER_SET).flat_map(move |glyph| {
            (0..ROWS_PER_GLYPH).flat_map(move |row| {
                (0..GLYPH_COLUMNS).map(move |col| CellAddress {
                    set,
                    glyph,
                    row,
                    col,
                })
            })
        })
    })
}

/// Pack a framebuffer into glyph sets
///
/// The upper 3 bits of every row byte are left at zero.
pub fn encode(fb: &Framebuffer) -> GlyphStore {
    let mut store = GlyphStore::new();
    for addr in cells() {
        let (x, y) = cell_position(addr);
        if fb.get(x, y) {
            store.glyph_mut(addr.set, addr.glyph).rows[addr.row] |= addr.bit();
        }
    }
    store
}

/// Unpack glyph sets into a framebuffer
///
/// The upper 3 bits of every row byte are ignored.
pub fn decode(store: &GlyphStore) -> Framebuffer {
    let mut fb = Framebuffer::new();
    for addr in cells() {
        let (x, y) = cell_position(addr);
        let on = store.glyph(addr.set, addr.glyph).rows[addr.row] & addr.bit() != 0;
        fb.set(x, y, on);
    }
    fb
}
