//! Logical pixel framebuffer
//!
//! An 80x16 monochrome raster, one `u128` bitmask per row (bit `x` = column
//! `x`). Coordinates outside the raster are never an error: writes are
//! dropped and reads return unset.

use core::fmt;

/// Framebuffer width in pixels
pub const WIDTH: usize = 80;

/// Framebuffer height in pixels
pub const HEIGHT: usize = 16;

/// How a primitive combines with existing pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrawMode {
    /// Force the pixel on
    #[default]
    Set,
    /// Flip the pixel
    Invert,
}

/// 80x16 monochrome framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Framebuffer {
    rows: [u128; HEIGHT],
}

impl Framebuffer {
    /// Create an all-clear framebuffer
    pub const fn new() -> Self {
        Self { rows: [0; HEIGHT] }
    }

    /// Reset every pixel to 0
    pub fn clear(&mut self) {
        self.rows = [0; HEIGHT];
    }

    /// Check whether a signed coordinate lies inside the raster
    pub const fn contains(x: i64, y: i64) -> bool {
        x >= 0 && x < WIDTH as i64 && y >= 0 && y < HEIGHT as i64
    }

    /// Read a pixel (out of range reads as unset)
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.rows[y] & (1 << x) != 0
    }

    /// Write a pixel (out of range is ignored)
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        if on {
            self.rows[y] |= 1 << x;
        } else {
            self.rows[y] &= !(1 << x);
        }
    }

    /// Apply a draw mode at a signed coordinate, clipping silently
    pub fn plot(&mut self, x: i64, y: i64, mode: DrawMode) {
        if !Self::contains(x, y) {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        match mode {
            DrawMode::Set => self.rows[y] |= 1 << x,
            DrawMode::Invert => self.rows[y] ^= 1 << x,
        }
    }

    /// Clear `height` rows starting at `y`, clipped to the raster
    pub fn clear_rows(&mut self, y: i64, height: usize) {
        for row in y..y.saturating_add(height as i64) {
            if (0..HEIGHT as i64).contains(&row) {
                self.rows[row as usize] = 0;
            }
        }
    }

    /// Number of set pixels
    pub fn count_set(&self) -> usize {
        self.rows.iter().map(|r| r.count_ones() as usize).sum()
    }

    /// Check if no pixel is set
    pub fn is_clear(&self) -> bool {
        self.rows.iter().all(|&r| r == 0)
    }

    /// Iterate over the coordinates of set pixels, row by row
    pub fn set_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..HEIGHT).flat_map(move |y| {
            (0..WIDTH)
                .filter(move |&x| self.get(x, y))
                .map(move |x| (x, y))
        })
    }
}

/// ASCII art dump: `#` for set, `.` for unset, one line per row
impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                f.write_str(if self.get(x, y) { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
