//! Glyph store layout shared between the composer and the driver.
//!
//! Layout (set-major, glyph next, row minor):
//! ```text
//! byte = set * 64 + glyph * 8 + row
//! ```
//! - 4 sets x 8 glyphs x 8 rows = 256 bytes
//! - Only the low 5 bits of each row byte are meaningful (bit 4 = leftmost
//!   pixel column); the upper 3 bits are ignored by readers

/// Number of glyph sets cycled by the interlacer
pub const SET_COUNT: usize = 4;

/// Glyphs per set (one per CGRAM slot)
pub const GLYPHS_PER_SET: usize = 8;

/// Pixel rows per glyph
pub const ROWS_PER_GLYPH: usize = 8;

/// Meaningful pixel columns per glyph row
pub const GLYPH_COLUMNS: usize = 5;

/// Mask of the meaningful bits in a row byte
pub const ROW_MASK: u8 = 0x1F;

/// Size of the serialized store in bytes
pub const STORE_SIZE: usize = SET_COUNT * GLYPHS_PER_SET * ROWS_PER_GLYPH;

/// Errors that can occur while moving a store in and out of byte buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Buffer is shorter than [`STORE_SIZE`]
    BufferTooSmall,
}

impl core::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LayoutError::BufferTooSmall => {
                write!(f, "buffer smaller than {STORE_SIZE} byte glyph store")
            }
        }
    }
}

/// One custom character: 8 rows of 5-bit patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph {
    /// Row patterns, top row first
    pub rows: [u8; ROWS_PER_GLYPH],
}

impl Glyph {
    /// An all-clear glyph
    pub const EMPTY: Glyph = Glyph {
        rows: [0; ROWS_PER_GLYPH],
    };

    /// Create a glyph from row bytes
    pub const fn new(rows: [u8; ROWS_PER_GLYPH]) -> Self {
        Self { rows }
    }

    /// Check whether the pixel at `col` (0 = leftmost) of `row` is set
    pub const fn pixel(&self, row: usize, col: usize) -> bool {
        self.rows[row] & (1 << (GLYPH_COLUMNS - 1 - col)) != 0
    }

    /// Copy of this glyph with the unused upper bits cleared
    pub fn masked(&self) -> Self {
        let mut rows = self.rows;
        for row in &mut rows {
            *row &= ROW_MASK;
        }
        Self { rows }
    }
}

/// One full assignment of the 8 CGRAM slots
pub type GlyphSet = [Glyph; GLYPHS_PER_SET];

/// Byte offset of a glyph row inside the serialized store
pub const fn offset(set: usize, glyph: usize, row: usize) -> usize {
    (set * GLYPHS_PER_SET + glyph) * ROWS_PER_GLYPH + row
}

/// The four glyph sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlyphStore {
    /// Sets indexed 0-3
    pub sets: [GlyphSet; SET_COUNT],
}

impl GlyphStore {
    /// Create an all-clear store
    pub const fn new() -> Self {
        Self {
            sets: [[Glyph::EMPTY; GLYPHS_PER_SET]; SET_COUNT],
        }
    }

    /// Get a glyph
    pub fn glyph(&self, set: usize, glyph: usize) -> &Glyph {
        &self.sets[set][glyph]
    }

    /// Get a mutable glyph
    pub fn glyph_mut(&mut self, set: usize, glyph: usize) -> &mut Glyph {
        &mut self.sets[set][glyph]
    }

    /// Check that no row carries bits outside [`ROW_MASK`]
    pub fn is_masked(&self) -> bool {
        self.sets
            .iter()
            .flatten()
            .all(|g| g.rows.iter().all(|&r| r & !ROW_MASK == 0))
    }

    /// Serialize into the shared layout
    pub fn to_bytes(&self) -> [u8; STORE_SIZE] {
        let mut bytes = [0u8; STORE_SIZE];
        for (chunk, glyph) in bytes
            .chunks_exact_mut(ROWS_PER_GLYPH)
            .zip(self.sets.iter().flatten())
        {
            chunk.copy_from_slice(&glyph.rows);
        }
        bytes
    }

    /// Serialize into a caller-provided buffer
    ///
    /// Returns the number of bytes written
    pub fn write_to(&self, buffer: &mut [u8]) -> Result<usize, LayoutError> {
        if buffer.len() < STORE_SIZE {
            return Err(LayoutError::BufferTooSmall);
        }

        buffer[..STORE_SIZE].copy_from_slice(&self.to_bytes());
        Ok(STORE_SIZE)
    }

    /// Deserialize from the shared layout
    ///
    /// Bytes are taken verbatim; readers ignore the upper 3 bits.
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, LayoutError> {
        if buffer.len() < STORE_SIZE {
            return Err(LayoutError::BufferTooSmall);
        }

        let mut store = Self::new();
        for (set, glyphs) in store.sets.iter_mut().enumerate() {
            for (glyph, g) in glyphs.iter_mut().enumerate() {
                let start = offset(set, glyph, 0);
                g.rows.copy_from_slice(&buffer[start..start + ROWS_PER_GLYPH]);
            }
        }

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_size() {
        assert_eq!(STORE_SIZE, 256);
        assert_eq!(offset(0, 0, 0), 0);
        assert_eq!(offset(0, 1, 0), 8);
        assert_eq!(offset(1, 0, 0), 64);
        assert_eq!(offset(3, 7, 7), 255);
    }

    #[test]
    fn test_layout_is_set_major() {
        let mut store = GlyphStore::new();
        store.glyph_mut(2, 5).rows[3] = 0x15;

        let bytes = store.to_bytes();
        assert_eq!(bytes[2 * 64 + 5 * 8 + 3], 0x15);
        assert_eq!(bytes.iter().filter(|&&b| b != 0).count(), 1);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buffer = [0u8; STORE_SIZE - 1];
        let store = GlyphStore::new();
        assert_eq!(store.write_to(&mut buffer), Err(LayoutError::BufferTooSmall));
        assert_eq!(
            GlyphStore::from_bytes(&buffer),
            Err(LayoutError::BufferTooSmall)
        );
    }

    #[test]
    fn test_glyph_pixel_msb_first() {
        let glyph = Glyph::new([0b10000, 0b00001, 0, 0, 0, 0, 0, 0xE0]);
        assert!(glyph.pixel(0, 0));
        assert!(!glyph.pixel(0, 4));
        assert!(glyph.pixel(1, 4));
        assert_eq!(glyph.masked().rows[7], 0);
    }

    #[test]
    fn test_is_masked() {
        let mut store = GlyphStore::new();
        assert!(store.is_masked());
        store.glyph_mut(0, 0).rows[0] = 0x20;
        assert!(!store.is_masked());
    }
}
