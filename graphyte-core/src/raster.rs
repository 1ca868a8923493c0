//! Raster primitives
//!
//! Every primitive takes signed coordinates and clips silently against the
//! 80x16 raster. In [`DrawMode::Invert`] each distinct pixel of a shape is
//! toggled exactly once, so drawing the same inverted shape twice restores
//! the original image.

use crate::framebuffer::{DrawMode, Framebuffer, HEIGHT, WIDTH};

/// Check whether an inclusive bounding box misses the raster entirely
fn outside(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> bool {
    max_x < 0 || max_y < 0 || min_x >= WIDTH as i64 || min_y >= HEIGHT as i64
}

/// Offset along the minor axis after `t` major steps, rounded to the
/// nearest pixel with halves pushed away from the start
fn minor_offset(t: i64, minor: i64, major: i64) -> i64 {
    if major == 0 {
        return 0;
    }
    let (t, minor, major) = (t as i128, minor as i128, major as i128);
    let steps = (2 * t * minor.abs() + major) / (2 * major);
    (minor.signum() * steps) as i64
}

/// Integer square root, rounded down
fn isqrt(n: i64) -> i64 {
    if n < 2 {
        return n.max(0);
    }
    let mut x = n / 2 + 1;
    let mut y = (x + n / x) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Outline height of a circle of radius² `r2` at horizontal offset `x`,
/// rounded to the nearest pixel
fn circle_height(r2: i64, x: i64) -> i64 {
    let s = r2 - x * x;
    let y = isqrt(s);
    if s - y * y > y {
        y + 1
    } else {
        y
    }
}

impl Framebuffer {
    /// Draw a line segment, endpoints inclusive
    ///
    /// One pixel per step along the major axis, the minor coordinate rounded
    /// to the nearest pixel. Only the visible part of the major axis is
    /// walked. Endpoints are put in a canonical order first, so swapping
    /// them yields the same pixels.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, mode: DrawMode) {
        let (mut a, mut b) = ((x0 as i64, y0 as i64), (x1 as i64, y1 as i64));
        if b < a {
            core::mem::swap(&mut a, &mut b);
        }
        let ((x0, y0), (x1, y1)) = (a, b);

        if outside(x0, y0.min(y1), x1, y0.max(y1)) {
            return;
        }

        // x0 <= x1 after ordering
        let (dx, dy) = (x1 - x0, y1 - y0);
        if dx >= dy.abs() {
            for x in x0.max(0)..=x1.min(WIDTH as i64 - 1) {
                self.plot(x, y0 + minor_offset(x - x0, dy, dx), mode);
            }
        } else {
            let (top, bottom) = (y0.min(y1).max(0), y0.max(y1).min(HEIGHT as i64 - 1));
            for y in top..=bottom {
                self.plot(x0 + minor_offset((y - y0).abs(), dx, dy.abs()), y, mode);
            }
        }
    }

    /// Draw the one-pixel outline of a `w` x `h` rectangle at (`x`, `y`)
    ///
    /// Non-positive sizes draw nothing.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, mode: DrawMode) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (x, y) = (x as i64, y as i64);
        let (right, bottom) = (x + w as i64 - 1, y + h as i64 - 1);
        if outside(x, y, right, bottom) {
            return;
        }

        for px in x.max(0)..=right.min(WIDTH as i64 - 1) {
            self.plot(px, y, mode);
            if bottom != y {
                self.plot(px, bottom, mode);
            }
        }
        // Sides without the corners already drawn above
        for py in (y + 1).max(0)..=(bottom - 1).min(HEIGHT as i64 - 1) {
            self.plot(x, py, mode);
            if right != x {
                self.plot(right, py, mode);
            }
        }
    }

    /// Fill a `w` x `h` rectangle at (`x`, `y`)
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, mode: DrawMode) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (x, y) = (x as i64, y as i64);
        let (right, bottom) = (x + w as i64 - 1, y + h as i64 - 1);

        for py in y.max(0)..=bottom.min(HEIGHT as i64 - 1) {
            for px in x.max(0)..=right.min(WIDTH as i64 - 1) {
                self.plot(px, py, mode);
            }
        }
    }

    /// Draw a circle outline
    ///
    /// For each offset `x` from 0 up to the diagonal the outline height is
    /// `round(sqrt(r² - x²))`, mirrored into all eight octants. Only offsets
    /// that can land on the raster are visited. A radius of 0 plots the
    /// centre; a negative radius draws nothing.
    pub fn draw_circle(&mut self, xc: i32, yc: i32, r: i32, mode: DrawMode) {
        if r < 0 {
            return;
        }
        let (xc, yc, r) = (xc as i64, yc as i64, r as i64);
        if outside(xc - r, yc - r, xc + r, yc + r) {
            return;
        }
        let r2 = r * r;

        // Last offset before the outline crosses the diagonal
        let (mut lo, mut hi) = (0, r);
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if mid <= circle_height(r2, mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let last = lo;

        // Offsets putting a column or a row of some octant on the raster
        let (w, h) = (WIDTH as i64 - 1, HEIGHT as i64 - 1);
        let mut spans = [
            (-xc, w - xc),
            (xc - w, xc),
            (-yc, h - yc),
            (yc - h, yc),
        ]
        .map(|(from, to)| (from.max(0), to.min(last)));
        spans.sort_unstable();

        let mut next = 0;
        for (from, to) in spans {
            for x in from.max(next)..=to {
                let y = circle_height(r2, x);
                let octants = [
                    (xc + x, yc + y),
                    (xc - x, yc + y),
                    (xc + x, yc - y),
                    (xc - x, yc - y),
                    (xc + y, yc + x),
                    (xc - y, yc + x),
                    (xc + y, yc - x),
                    (xc - y, yc - x),
                ];
                // On the axes and diagonals several octants land on one pixel
                for (i, &(px, py)) in octants.iter().enumerate() {
                    if !octants[..i].contains(&(px, py)) {
                        self.plot(px, py, mode);
                    }
                }
            }
            next = next.max(to + 1);
        }
    }

    /// Fill every pixel with `dx² + dy² <= r²` around (`xc`, `yc`)
    pub fn fill_circle(&mut self, xc: i32, yc: i32, r: i32, mode: DrawMode) {
        if r < 0 {
            return;
        }
        let (xc, yc, r) = (xc as i64, yc as i64, r as i64);
        let r2 = r * r;

        for py in (yc - r).max(0)..=(yc + r).min(HEIGHT as i64 - 1) {
            for px in (xc - r).max(0)..=(xc + r).min(WIDTH as i64 - 1) {
                let (dx, dy) = (px - xc, py - yc);
                if dx * dx + dy * dy <= r2 {
                    self.plot(px, py, mode);
                }
            }
        }
    }
}
