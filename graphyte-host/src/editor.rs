//! Drawing session
//!
//! An editor session starts from the picture already in the glyph store,
//! applies drawing operations to its framebuffer one after another, and
//! publishes the result. Scrolling publishes every frame on its own.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use graphyte_core::font::FontError;
use graphyte_core::text::{Scroll, ScrollDirection, TextStrip};
use graphyte_core::{decode, encode, DrawMode, FontTable, Framebuffer};
use graphyte_hal_linux::SharedGlyphStore;
use graphyte_protocol::glyph::{GLYPHS_PER_SET, SET_COUNT};
use graphyte_protocol::GlyphStore;
use thiserror::Error;
use tracing::{debug, info};

/// Editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("failed to read font {path}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load font {path}")]
    FontParse {
        path: PathBuf,
        #[source]
        source: FontError,
    },

    #[error("a font is required for {op} (pass --font first)")]
    FontRequired { op: &'static str },

    #[error("failed to write output")]
    Output(#[from] io::Error),
}

/// Outline or filled shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Outline,
    Filled,
}

/// One drawing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// Unset every pixel
    Clear,
    /// Load the font used by later text operations
    Font(PathBuf),
    Text {
        x: i32,
        y: i32,
        text: String,
    },
    /// Blocking scroll animation over a 16-row band
    ScrollText {
        y: i32,
        step: Duration,
        text: String,
        direction: ScrollDirection,
    },
    Line {
        from: (i32, i32),
        to: (i32, i32),
        mode: DrawMode,
    },
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        fill: Fill,
        mode: DrawMode,
    },
    Circle {
        xc: i32,
        yc: i32,
        r: i32,
        fill: Fill,
        mode: DrawMode,
    },
}

impl DrawOp {
    /// Apply a pure raster operation; returns `false` for operations that
    /// need the session (fonts, text, scrolling)
    pub fn apply_raster(&self, fb: &mut Framebuffer) -> bool {
        match *self {
            DrawOp::Clear => fb.clear(),
            DrawOp::Line { from, to, mode } => fb.draw_line(from.0, from.1, to.0, to.1, mode),
            DrawOp::Rect {
                x,
                y,
                w,
                h,
                fill,
                mode,
            } => match fill {
                Fill::Outline => fb.draw_rect(x, y, w, h, mode),
                Fill::Filled => fb.fill_rect(x, y, w, h, mode),
            },
            DrawOp::Circle {
                xc,
                yc,
                r,
                fill,
                mode,
            } => match fill {
                Fill::Outline => fb.draw_circle(xc, yc, r, mode),
                Fill::Filled => fb.fill_circle(xc, yc, r, mode),
            },
            DrawOp::Font(_) | DrawOp::Text { .. } | DrawOp::ScrollText { .. } => return false,
        }
        true
    }
}

/// Destination for finished frames
pub trait FrameSink {
    /// Current contents, decoded
    fn snapshot(&self) -> Framebuffer;

    /// Replace the contents with `fb`
    fn publish(&mut self, fb: &Framebuffer);
}

impl FrameSink for SharedGlyphStore {
    fn snapshot(&self) -> Framebuffer {
        decode(&self.load())
    }

    fn publish(&mut self, fb: &Framebuffer) {
        self.save(&encode(fb));
    }
}

impl FrameSink for GlyphStore {
    fn snapshot(&self) -> Framebuffer {
        decode(self)
    }

    fn publish(&mut self, fb: &Framebuffer) {
        *self = encode(fb);
    }
}

/// Read and parse a font file
pub fn load_font(path: &Path) -> Result<FontTable, EditorError> {
    let source = fs::read_to_string(path).map_err(|source| EditorError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    let font = FontTable::parse(&source).map_err(|source| EditorError::FontParse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), glyphs = font.defined_count(), "font loaded");
    Ok(font)
}

/// Write the store as hex, one glyph per line
pub fn write_store_hex<W: Write>(store: &GlyphStore, out: &mut W) -> io::Result<()> {
    for set in 0..SET_COUNT {
        writeln!(out, "set {set}:")?;
        for slot in 0..GLYPHS_PER_SET {
            write!(out, "  {slot}:")?;
            for row in store.glyph(set, slot).rows {
                write!(out, " {row:02x}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Framebuffer, font and output of one invocation
pub struct Editor<S, W> {
    sink: S,
    fb: Framebuffer,
    font: Option<FontTable>,
    debug: bool,
    out: W,
}

impl<S: FrameSink, W: Write> Editor<S, W> {
    /// Start from the picture currently in `sink`
    pub fn new(sink: S, out: W) -> Self {
        let fb = sink.snapshot();
        Self {
            sink,
            fb,
            font: None,
            debug: false,
            out,
        }
    }

    /// Print the framebuffer after every published frame
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn font(&self) -> Option<&FontTable> {
        self.font.as_ref()
    }

    pub fn apply(&mut self, op: &DrawOp) -> Result<(), EditorError> {
        if op.apply_raster(&mut self.fb) {
            return Ok(());
        }

        match op {
            DrawOp::Font(path) => {
                self.font = Some(load_font(path)?);
            }
            DrawOp::Text { x, y, text } => {
                let font = self
                    .font
                    .as_ref()
                    .ok_or(EditorError::FontRequired { op: "text" })?;
                self.fb.draw_text(font, *x, *y, text);
            }
            DrawOp::ScrollText {
                y,
                step,
                text,
                direction,
            } => self.scroll(*y, *step, text, *direction)?,
            _ => {}
        }
        Ok(())
    }

    /// Run a scroll to completion, publishing each frame
    fn scroll(
        &mut self,
        y: i32,
        step: Duration,
        text: &str,
        direction: ScrollDirection,
    ) -> Result<(), EditorError> {
        let font = self
            .font
            .as_ref()
            .ok_or(EditorError::FontRequired { op: "scrolling text" })?;
        let mut scroll = Scroll::new(TextStrip::render(font, text), y, direction);
        info!(frames = scroll.frame_count(), ?direction, "scrolling text");

        loop {
            scroll.render(&mut self.fb);
            self.flush()?;
            if !step.is_zero() {
                thread::sleep(step);
            }
            if !scroll.advance() {
                break;
            }
        }
        Ok(())
    }

    /// Publish the framebuffer, dumping it when debugging
    pub fn flush(&mut self) -> Result<(), EditorError> {
        self.sink.publish(&self.fb);
        if self.debug {
            writeln!(self.out, "{}", self.fb)?;
        }
        Ok(())
    }

    /// Publish and hand back the sink and output
    pub fn finish(mut self) -> Result<(S, W), EditorError> {
        self.flush()?;
        Ok((self.sink, self.out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphyte_core::font::{GLYPH_HEIGHT, GLYPH_WIDTH};
    use graphyte_core::WIDTH;

    /// Records every published frame
    #[derive(Default)]
    struct Frames {
        initial: Framebuffer,
        published: Vec<Framebuffer>,
    }

    impl FrameSink for Frames {
        fn snapshot(&self) -> Framebuffer {
            self.initial
        }

        fn publish(&mut self, fb: &Framebuffer) {
            self.published.push(*fb);
        }
    }

    /// Font defining only 'A', fully set
    fn font_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CHAR 65 'A'").unwrap();
        for _ in 0..GLYPH_HEIGHT {
            writeln!(file, "1111111111").unwrap();
        }
        file
    }

    #[test]
    fn test_font_file_text_matches_bitmap() {
        const ROWS: [&str; GLYPH_HEIGHT] = [
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
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CHAR 65 'A'").unwrap();
        for row in ROWS {
            writeln!(file, "{row}").unwrap();
        }

        let mut editor = Editor::new(Frames::default(), Vec::new());
        editor.apply(&DrawOp::Font(file.path().to_path_buf())).unwrap();
        editor
            .apply(&DrawOp::Text {
                x: 0,
                y: 0,
                text: "A".into(),
            })
            .unwrap();
        let (frames, _) = editor.finish().unwrap();

        let published = frames.published.last().unwrap();
        for (y, row) in ROWS.iter().enumerate() {
            for x in 0..WIDTH {
                let expected = x < GLYPH_WIDTH && row.as_bytes()[x] == b'1';
                assert_eq!(published.get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_session_starts_from_store() {
        let mut initial = Framebuffer::new();
        initial.set(5, 5, true);
        let store = encode(&initial);

        let mut editor = Editor::new(store, Vec::new());
        editor
            .apply(&DrawOp::Line {
                from: (0, 0),
                to: (3, 0),
                mode: DrawMode::Set,
            })
            .unwrap();
        let (store, out) = editor.finish().unwrap();

        let result = decode(&store);
        assert!(result.get(5, 5));
        assert!(result.get(3, 0));
        assert_eq!(result.count_set(), 5);
        assert!(out.is_empty());
    }

    #[test]
    fn test_ops_apply_in_order() {
        let mut editor = Editor::new(Frames::default(), Vec::new());
        let rect = DrawOp::Rect {
            x: 0,
            y: 0,
            w: 4,
            h: 4,
            fill: Fill::Filled,
            mode: DrawMode::Set,
        };
        editor.apply(&rect).unwrap();
        editor.apply(&DrawOp::Clear).unwrap();
        editor
            .apply(&DrawOp::Circle {
                xc: 40,
                yc: 8,
                r: 0,
                fill: Fill::Outline,
                mode: DrawMode::Invert,
            })
            .unwrap();

        assert_eq!(editor.framebuffer().count_set(), 1);
        assert!(editor.framebuffer().get(40, 8));
    }

    #[test]
    fn test_text_requires_font() {
        let mut editor = Editor::new(Frames::default(), Vec::new());
        let text = DrawOp::Text {
            x: 0,
            y: 0,
            text: "A".into(),
        };
        let err = editor.apply(&text).unwrap_err();
        assert!(matches!(err, EditorError::FontRequired { .. }));

        let font = font_file();
        editor
            .apply(&DrawOp::Font(font.path().to_path_buf()))
            .unwrap();
        editor.apply(&text).unwrap();
        assert_eq!(
            editor.framebuffer().count_set(),
            GLYPH_WIDTH * GLYPH_HEIGHT
        );
    }

    #[test]
    fn test_bad_font() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = Editor::new(Frames::default(), Vec::new());

        let err = editor
            .apply(&DrawOp::Font(dir.path().join("absent.font")))
            .unwrap_err();
        assert!(matches!(err, EditorError::FontRead { .. }));

        let empty = dir.path().join("empty.font");
        fs::write(&empty, "nothing here\n").unwrap();
        let err = editor.apply(&DrawOp::Font(empty)).unwrap_err();
        assert!(matches!(
            err,
            EditorError::FontParse {
                source: FontError::NoGlyphs,
                ..
            }
        ));
        assert!(editor.font().is_none());
    }

    #[test]
    fn test_scroll_publishes_every_frame() {
        let font = font_file();
        let mut initial = Framebuffer::new();
        initial.set(0, 0, true);
        let mut editor = Editor::new(
            Frames {
                initial,
                ..Frames::default()
            },
            Vec::new(),
        )
        .with_debug(true);

        editor
            .apply(&DrawOp::Font(font.path().to_path_buf()))
            .unwrap();
        editor
            .apply(&DrawOp::ScrollText {
                y: 8,
                step: Duration::ZERO,
                text: "A".into(),
                direction: ScrollDirection::RightToLeft,
            })
            .unwrap();

        let frames = &editor.sink().published;
        assert_eq!(frames.len(), WIDTH + 11);
        assert!(frames.iter().all(|fb| fb.get(0, 0)));
        // Strip enters at the right edge one column per frame
        assert!(!frames[0].get(79, 8));
        assert!(frames[1].get(79, 8));
        assert!(frames[1].get(79, 15));
        assert!(!frames[1].get(78, 8));

        let (sink, out) = editor.finish().unwrap();
        assert_eq!(sink.published.len(), WIDTH + 12);
        let dump = String::from_utf8(out).unwrap();
        assert_eq!(dump.lines().filter(|l| l.is_empty()).count(), WIDTH + 12);
    }

    #[test]
    fn test_store_hex_dump() {
        let mut store = GlyphStore::new();
        store.glyph_mut(2, 7).rows[0] = 0x1F;

        let mut out = Vec::new();
        write_store_hex(&store, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), SET_COUNT * (GLYPHS_PER_SET + 1));
        assert_eq!(lines[0], "set 0:");
        assert_eq!(lines[1], "  0: 00 00 00 00 00 00 00 00");
        assert_eq!(lines[2 * 9 + 8], "  7: 1f 00 00 00 00 00 00 00");
    }
}
