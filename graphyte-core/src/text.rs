//! Text placement and scrolling
//!
//! Glyphs are blitted opaquely: both set and unset bitmap pixels overwrite
//! the framebuffer. Characters advance by one glyph width plus one blank
//! column. Characters without a table slot draw nothing but still advance.

use alloc::vec::Vec;

use crate::font::{FontTable, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::framebuffer::{Framebuffer, WIDTH};

/// Horizontal distance between consecutive characters
pub const CHAR_PITCH: usize = GLYPH_WIDTH + 1;

impl Framebuffer {
    /// Draw a string with its top-left corner at (`x`, `y`)
    pub fn draw_text(&mut self, font: &FontTable, x: i32, y: i32, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            let Some(bitmap) = font.glyph(ch) else {
                continue;
            };
            let left = x as i64 + (i * CHAR_PITCH) as i64;
            if left >= WIDTH as i64 {
                break;
            }
            for (row, bits) in bitmap.iter().enumerate() {
                let py = y as i64 + row as i64;
                for col in 0..GLYPH_WIDTH {
                    let px = left + col as i64;
                    if Framebuffer::contains(px, py) {
                        self.set(px as usize, py as usize, bits & (1 << col) != 0);
                    }
                }
            }
        }
    }
}

/// A message rendered once into an off-screen strip
///
/// Stored column-major: one `u16` per column, bit `row` = pixel row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStrip {
    columns: Vec<u16>,
}

impl TextStrip {
    /// Render `text`, `len * 11` columns wide
    pub fn render(font: &FontTable, text: &str) -> Self {
        let count = text.chars().count();
        let mut columns = alloc::vec![0u16; count * CHAR_PITCH];

        for (i, ch) in text.chars().enumerate() {
            let Some(bitmap) = font.glyph(ch) else {
                continue;
            };
            let base = i * CHAR_PITCH;
            for (row, bits) in bitmap.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << col) != 0 {
                        columns[base + col] |= 1 << row;
                    }
                }
            }
        }

        Self { columns }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column bitmask (bit `row` = pixel row), blank outside the strip
    pub fn column(&self, x: i64) -> u16 {
        usize::try_from(x)
            .ok()
            .and_then(|x| self.columns.get(x))
            .copied()
            .unwrap_or(0)
    }
}

/// Scroll direction, parsed from the numeric code used on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollDirection {
    /// Enter at the right edge and move left (code `1`)
    RightToLeft,
    /// Enter at the left edge and move right (any other code)
    LeftToRight,
}

impl ScrollDirection {
    /// Map a direction code
    pub const fn from_code(code: i32) -> Self {
        if code == 1 {
            ScrollDirection::RightToLeft
        } else {
            ScrollDirection::LeftToRight
        }
    }
}

/// Scrolling animation over a 16-row band
///
/// Each frame: [`render`](Self::render) into the framebuffer, publish it,
/// wait, then [`advance`](Self::advance) until it reports the end.
#[derive(Debug, Clone)]
pub struct Scroll {
    strip: TextStrip,
    y: i32,
    direction: ScrollDirection,
    offset: i64,
}

impl Scroll {
    /// Start a scroll with the strip just outside the display
    pub fn new(strip: TextStrip, y: i32, direction: ScrollDirection) -> Self {
        let offset = match direction {
            ScrollDirection::RightToLeft => WIDTH as i64,
            ScrollDirection::LeftToRight => -(strip.width() as i64),
        };
        Self {
            strip,
            y,
            direction,
            offset,
        }
    }

    /// Display column of the strip's first column
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Number of frames from start to finish
    pub fn frame_count(&self) -> usize {
        WIDTH + self.strip.width()
    }

    /// Clear the band and copy the visible window of the strip into it
    pub fn render(&self, fb: &mut Framebuffer) {
        fb.clear_rows(self.y as i64, GLYPH_HEIGHT);
        for x in 0..WIDTH {
            let bits = self.strip.column(x as i64 - self.offset);
            if bits == 0 {
                continue;
            }
            for row in 0..GLYPH_HEIGHT {
                let py = self.y as i64 + row as i64;
                if bits & (1 << row) != 0 && Framebuffer::contains(x as i64, py) {
                    fb.set(x, py as usize, true);
                }
            }
        }
    }

    /// Move one column; returns `false` once the strip has left the display
    pub fn advance(&mut self) -> bool {
        let width = self.strip.width() as i64;
        match self.direction {
            ScrollDirection::RightToLeft => {
                self.offset -= 1;
                self.offset + width > 0
            }
            ScrollDirection::LeftToRight => {
                self.offset += 1;
                self.offset < WIDTH as i64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Bitmap;
    use crate::framebuffer::HEIGHT;

    /// Every pixel of 'A' set, and a checkerboard for 'B'
    fn font() -> FontTable {
        let mut font = FontTable::new();
        font.set_glyph('A', [0x3FF; GLYPH_HEIGHT]);
        let mut checker: Bitmap = [0; GLYPH_HEIGHT];
        for (row, bits) in checker.iter_mut().enumerate() {
            *bits = if row % 2 == 0 { 0x155 } else { 0x2AA };
        }
        font.set_glyph('B', checker);
        font
    }

    #[test]
    fn test_draw_single_char() {
        let font = font();
        let mut fb = Framebuffer::new();
        fb.draw_text(&font, 0, 0, "A");

        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                assert_eq!(fb.get(x, y), x < GLYPH_WIDTH, "pixel ({x}, {y})");
            }
        }
    }

    /// Lopsided glyph, so a mirrored or shifted draw shows up
    const F_ROWS: [&str; GLYPH_HEIGHT] = [
        "1111111111",
        "1000000000",
        "1000000000",
        "1111110000",
        "1000000000",
        "1000000000",
        "1000000000",
        "1000000001",
        "0000000011",
        "0000000111",
        "0000001111",
        "0000000000",
        "0100000000",
        "0010000000",
        "0001000000",
        "0000000000",
    ];

    #[test]
    fn test_parsed_font_draws_exact_bitmap() {
        let mut source = alloc::string::String::from("CHAR 65 'A'\n");
        for row in F_ROWS {
            source.push_str(row);
            source.push('\n');
        }
        let font = FontTable::parse(&source).unwrap();

        let mut fb = Framebuffer::new();
        fb.draw_text(&font, 0, 0, "A");

        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let expected = x < GLYPH_WIDTH && F_ROWS[y].as_bytes()[x] == b'1';
                assert_eq!(fb.get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_draw_text_is_opaque() {
        let font = font();
        let mut fb = Framebuffer::new();
        fb.fill_rect(0, 0, 80, 16, crate::DrawMode::Set);
        fb.draw_text(&font, 0, 0, "B");

        assert!(fb.get(0, 0));
        assert!(!fb.get(1, 0));
        assert!(!fb.get(0, 1));
        // Spacing column is not touched
        assert!(fb.get(GLYPH_WIDTH, 0));
    }

    #[test]
    fn test_skipped_chars_advance_the_pen() {
        let font = font();
        let mut fb = Framebuffer::new();
        fb.draw_text(&font, 0, 0, "\u{1}A");

        assert!(!fb.get(0, 0));
        assert!(fb.get(CHAR_PITCH, 0));
        assert_eq!(fb.count_set(), GLYPH_WIDTH * GLYPH_HEIGHT);
    }

    #[test]
    fn test_draw_text_clips() {
        let font = font();
        let mut fb = Framebuffer::new();
        fb.draw_text(&font, 75, 10, "AA");
        assert_eq!(fb.count_set(), 5 * 6);

        fb.clear();
        fb.draw_text(&font, -5, -20, "A");
        assert!(fb.is_clear());
    }

    #[test]
    fn test_strip_layout() {
        let font = font();
        let strip = TextStrip::render(&font, "A\u{1}A");
        assert_eq!(strip.width(), 3 * CHAR_PITCH);
        assert_eq!(strip.column(0), 0xFFFF);
        assert_eq!(strip.column(GLYPH_WIDTH as i64), 0);
        assert_eq!(strip.column(CHAR_PITCH as i64), 0);
        assert_eq!(strip.column(2 * CHAR_PITCH as i64), 0xFFFF);
        assert_eq!(strip.column(-1), 0);
        assert_eq!(strip.column(1000), 0);
    }

    #[test]
    fn test_direction_codes() {
        assert_eq!(ScrollDirection::from_code(1), ScrollDirection::RightToLeft);
        assert_eq!(ScrollDirection::from_code(0), ScrollDirection::LeftToRight);
        assert_eq!(ScrollDirection::from_code(-1), ScrollDirection::LeftToRight);
    }

    #[test]
    fn test_right_to_left_run() {
        let font = font();
        let mut scroll = Scroll::new(
            TextStrip::render(&font, "A"),
            0,
            ScrollDirection::RightToLeft,
        );
        assert_eq!(scroll.offset(), 80);

        let mut fb = Framebuffer::new();
        let mut frames = 1;
        scroll.render(&mut fb);
        assert!(fb.is_clear());
        while scroll.advance() {
            scroll.render(&mut fb);
            frames += 1;
        }
        assert_eq!(frames, scroll.frame_count());
        // Last rendered frame shows only the trailing spacing column
        assert_eq!(scroll.offset() + CHAR_PITCH as i64, 0);
        assert!(fb.is_clear());
    }

    #[test]
    fn test_left_to_right_run() {
        let font = font();
        let mut scroll = Scroll::new(
            TextStrip::render(&font, "A"),
            0,
            ScrollDirection::LeftToRight,
        );
        assert_eq!(scroll.offset(), -(CHAR_PITCH as i64));

        let mut frames = 1;
        while scroll.advance() {
            frames += 1;
        }
        assert_eq!(frames, scroll.frame_count());
        assert_eq!(scroll.offset(), 80);
    }

    #[test]
    fn test_scroll_only_touches_band() {
        let font = font();
        let mut fb = Framebuffer::new();
        fb.set(0, 0, true);
        fb.set(40, 12, true);

        let mut scroll = Scroll::new(
            TextStrip::render(&font, "A"),
            8,
            ScrollDirection::LeftToRight,
        );
        for _ in 0..CHAR_PITCH + 2 {
            scroll.advance();
        }
        scroll.render(&mut fb);

        assert!(fb.get(0, 0));
        assert!(!fb.get(40, 12));
        // Strip starts at column 2, rows 8-15 visible
        assert!(fb.get(2, 8));
        assert!(fb.get(11, 15));
        assert!(!fb.get(1, 8));
        assert!(!fb.get(12, 8));
        assert!(!fb.get(2, 7));
    }
}
