//! Bitmap font table
//!
//! Fonts are plain text. A `CHAR <code>` line (optionally followed by the
//! quoted character) starts a glyph; the next 16 lines are its rows, each
//! read as 10 characters where `1` is a set pixel:
//!
//! ```text
//! CHAR 65 'A'
//! 0000110000
//! 0001111000
//! ...
//! ```
//!
//! Codes outside the printable range are skipped with their rows. Short or
//! missing rows leave the remaining pixels unset.

use core::fmt;

/// Glyph width in pixels
pub const GLYPH_WIDTH: usize = 10;

/// Glyph height in pixels
pub const GLYPH_HEIGHT: usize = 16;

/// First code in the table (space)
pub const FIRST_CODE: u8 = 32;

/// Last code in the table (`~`)
pub const LAST_CODE: u8 = 126;

/// Number of glyph slots
pub const GLYPH_COUNT: usize = (LAST_CODE - FIRST_CODE) as usize + 1;

/// One glyph: a row bitmask per pixel row, bit `col` = column `col`
pub type Bitmap = [u16; GLYPH_HEIGHT];

const RECORD_TAG: &str = "CHAR ";

/// Font parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontError {
    /// A `CHAR` line without a decimal code (1-based line number)
    InvalidCode { line: usize },
    /// The source defines no printable glyph
    NoGlyphs,
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::InvalidCode { line } => {
                write!(f, "line {line}: CHAR record without a decimal code")
            }
            FontError::NoGlyphs => write!(f, "font defines no printable glyphs"),
        }
    }
}

impl core::error::Error for FontError {}

/// Printable ASCII glyph table, 10x16 per glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontTable {
    glyphs: [Bitmap; GLYPH_COUNT],
    defined: [bool; GLYPH_COUNT],
}

impl Default for FontTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FontTable {
    /// Create a table with every glyph blank and undefined
    pub const fn new() -> Self {
        Self {
            glyphs: [[0; GLYPH_HEIGHT]; GLYPH_COUNT],
            defined: [false; GLYPH_COUNT],
        }
    }

    /// Parse a font source
    pub fn parse(source: &str) -> Result<Self, FontError> {
        let mut table = Self::new();
        // Slot being filled and the next row to fill
        let mut current: Option<(usize, usize)> = None;

        for (number, line) in source.lines().enumerate() {
            if let Some(rest) = line.strip_prefix(RECORD_TAG) {
                let code = parse_code(rest).ok_or(FontError::InvalidCode { line: number + 1 })?;

                // Negative or oversized codes name no slot; their rows are skipped
                current = u32::try_from(code).ok().and_then(Self::index).map(|slot| {
                    table.glyphs[slot] = [0; GLYPH_HEIGHT];
                    table.defined[slot] = true;
                    (slot, 0)
                });
                continue;
            }

            if let Some((slot, row)) = current.as_mut() {
                if *row < GLYPH_HEIGHT {
                    table.glyphs[*slot][*row] = parse_row(line);
                    *row += 1;
                }
            }
        }

        if table.defined_count() == 0 {
            return Err(FontError::NoGlyphs);
        }
        Ok(table)
    }

    fn index(code: u32) -> Option<usize> {
        (FIRST_CODE as u32..=LAST_CODE as u32)
            .contains(&code)
            .then(|| (code - FIRST_CODE as u32) as usize)
    }

    /// Bitmap for a character, `None` outside 32..=126
    pub fn glyph(&self, ch: char) -> Option<&Bitmap> {
        Self::index(ch as u32).map(|slot| &self.glyphs[slot])
    }

    /// Check whether the source defined a character
    pub fn is_defined(&self, ch: char) -> bool {
        Self::index(ch as u32).is_some_and(|slot| self.defined[slot])
    }

    /// Replace the bitmap of a character
    ///
    /// Returns `false` (and changes nothing) outside 32..=126.
    pub fn set_glyph(&mut self, ch: char, bitmap: Bitmap) -> bool {
        match Self::index(ch as u32) {
            Some(slot) => {
                self.glyphs[slot] = bitmap.map(|row| row & ROW_BITS);
                self.defined[slot] = true;
                true
            }
            None => false,
        }
    }

    /// Number of characters defined
    pub fn defined_count(&self) -> usize {
        self.defined.iter().filter(|&&d| d).count()
    }

    /// Serialize the defined glyphs back into the source format
    pub fn write_to<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        for (slot, bitmap) in self.glyphs.iter().enumerate() {
            if !self.defined[slot] {
                continue;
            }
            let code = FIRST_CODE as usize + slot;
            writeln!(out, "{RECORD_TAG}{code} '{}'", code as u8 as char)?;
            for row in bitmap {
                for col in 0..GLYPH_WIDTH {
                    out.write_char(if row & (1 << col) != 0 { '1' } else { '0' })?;
                }
                out.write_char('\n')?;
            }
        }
        Ok(())
    }
}

const ROW_BITS: u16 = (1 << GLYPH_WIDTH) - 1;

/// Leading signed decimal of a `CHAR` record, saturating at the `i64` bounds
fn parse_code(rest: &str) -> Option<i64> {
    let rest = rest.trim_start();
    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_row(line: &str) -> u16 {
    line.bytes()
        .take(GLYPH_WIDTH)
        .enumerate()
        .filter(|&(_, b)| b == b'1')
        .fold(0, |row, (col, _)| row | 1 << col)
}
