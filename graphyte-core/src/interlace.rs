//! Interlace frame plan
//!
//! The driver cycles the four glyph sets. For every frame it uploads one
//! set into CGRAM and prints the index characters 1-9, two DDRAM cells per
//! character. Even frames put the code first (`c ␠`), odd frames put the
//! blank first (`␠ c`), shifting the picture by half a character. Character
//! codes 8 and 9 alias CGRAM slots 0 and 1.
//!
//! ```text
//! frame  set  index line        cursor restore line (for the next frame)
//!   0     0   "1 2 3 ... 9 "    unchanged
//!   1     1   " 1 2 3 ... 9"    -> line 2
//!   2     2   "1 2 3 ... 9 "    unchanged
//!   3     3   " 1 2 3 ... 9"    -> line 1
//! ```

use graphyte_protocol::glyph::SET_COUNT;
use graphyte_protocol::DisplayLine;
use heapless::Vec;

/// Number of index characters printed per frame
pub const INDEX_CHARS: u8 = 9;

/// Length of the index line in bytes
pub const INDEX_LINE_LEN: usize = 2 * INDEX_CHARS as usize;

/// Index line bytes for one frame
pub type IndexLine = Vec<u8, INDEX_LINE_LEN>;

/// Placement of the code inside each two-cell pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Spacing {
    /// `c ␠` (even frames)
    CodeFirst,
    /// `␠ c` (odd frames)
    BlankFirst,
}

/// Animation state of the interlacer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterlaceState {
    frame: u8,
    restore: DisplayLine,
}

impl InterlaceState {
    /// Start at frame 0 with the cursor restored to line 1
    pub const fn new() -> Self {
        Self {
            frame: 0,
            restore: DisplayLine::First,
        }
    }

    /// Index of the glyph set shown this frame (0-3)
    pub const fn frame_index(&self) -> usize {
        self.frame as usize
    }

    /// Line the cursor returns to after each CGRAM upload
    pub const fn restore_line(&self) -> DisplayLine {
        self.restore
    }

    /// Spacing of the index line for this frame
    pub const fn spacing(&self) -> Spacing {
        if self.frame % 2 == 0 {
            Spacing::CodeFirst
        } else {
            Spacing::BlankFirst
        }
    }

    /// Bytes printed after the upload
    pub fn index_line(&self) -> IndexLine {
        let mut line = IndexLine::new();
        for code in 1..=INDEX_CHARS {
            let pair = match self.spacing() {
                Spacing::CodeFirst => [code, b' '],
                Spacing::BlankFirst => [b' ', code],
            };
            // Capacity is exactly 9 pairs
            let _ = line.extend_from_slice(&pair);
        }
        line
    }

    /// Finish the frame: odd frames move the restore line, then step the set
    pub fn advance(&mut self) {
        match self.frame {
            1 => self.restore = DisplayLine::Second,
            3 => self.restore = DisplayLine::First,
            _ => {}
        }
        self.frame = (self.frame + 1) % SET_COUNT as u8;
    }
}
