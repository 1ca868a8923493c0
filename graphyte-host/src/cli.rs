//! Command-line interfaces
//!
//! The editor's drawing flags may repeat and are applied in the order they
//! appear on the command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgMatches, Parser};
use graphyte_core::text::ScrollDirection;
use graphyte_core::DrawMode;
use thiserror::Error;

use crate::editor::{DrawOp, Fill};

/// Argument errors clap cannot catch
#[derive(Debug, Error)]
pub enum CliError {
    #[error("--{flag}: expected an integer, got {value:?}")]
    InvalidNumber { flag: &'static str, value: String },
}

/// Graphyte LCD driver
#[derive(Debug, Parser)]
#[command(name = "graphyte-lcd", version, about)]
pub struct DriverArgs {
    /// Configuration file merged over the built-in defaults
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the sysfs GPIO directory
    #[arg(long, value_name = "PATH")]
    pub sysfs_root: Option<PathBuf>,

    /// Leave the glyph store as it is, even with `clear_on_start`
    #[arg(long)]
    pub keep_store: bool,
}

/// Driver arguments used by the editor's `--start-lcd`
///
/// The editor clears the store itself before starting the driver, so the
/// driver is told to keep it.
pub fn driver_args(config: Option<&Path>) -> Vec<OsString> {
    let mut args = vec![OsString::from("--keep-store")];
    if let Some(path) = config {
        args.push("--config".into());
        args.push(path.into());
    }
    args
}

/// Draw into the Graphyte glyph store
#[derive(Debug, Parser)]
#[command(name = "graphyte-editor", version, about, args_override_self = true)]
pub struct EditorArgs {
    /// Configuration file merged over the built-in defaults
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the framebuffer after every update
    #[arg(long)]
    pub debug: bool,

    /// Unset every pixel
    #[arg(long)]
    pub clear: bool,

    /// Load a font for the text operations that follow
    #[arg(long, value_name = "FILE")]
    pub font: Vec<PathBuf>,

    /// Draw text with its top-left corner at X,Y
    #[arg(long, num_args = 3, value_names = ["X", "Y", "TEXT"], allow_hyphen_values = true)]
    pub text: Vec<String>,

    /// Scroll text across a 16-row band (DIR 1 = right to left)
    #[arg(
        long,
        num_args = 4,
        value_names = ["Y", "STEP_MS", "TEXT", "DIR"],
        allow_hyphen_values = true
    )]
    pub scroll_text: Vec<String>,

    #[arg(long, num_args = 4, value_names = ["X0", "Y0", "X1", "Y1"], allow_negative_numbers = true)]
    pub line: Vec<i32>,

    #[arg(long, num_args = 4, value_names = ["X0", "Y0", "X1", "Y1"], allow_negative_numbers = true)]
    pub invert_line: Vec<i32>,

    #[arg(long, num_args = 4, value_names = ["X", "Y", "W", "H"], allow_negative_numbers = true)]
    pub rect: Vec<i32>,

    #[arg(long, num_args = 4, value_names = ["X", "Y", "W", "H"], allow_negative_numbers = true)]
    pub invert_rect: Vec<i32>,

    #[arg(long, num_args = 4, value_names = ["X", "Y", "W", "H"], allow_negative_numbers = true)]
    pub rect_filled: Vec<i32>,

    #[arg(long, num_args = 4, value_names = ["X", "Y", "W", "H"], allow_negative_numbers = true)]
    pub invert_rect_filled: Vec<i32>,

    #[arg(long, num_args = 3, value_names = ["XC", "YC", "R"], allow_negative_numbers = true)]
    pub circle: Vec<i32>,

    #[arg(long, num_args = 3, value_names = ["XC", "YC", "R"], allow_negative_numbers = true)]
    pub invert_circle: Vec<i32>,

    #[arg(long, num_args = 3, value_names = ["XC", "YC", "R"], allow_negative_numbers = true)]
    pub circle_filled: Vec<i32>,

    #[arg(long, num_args = 3, value_names = ["XC", "YC", "R"], allow_negative_numbers = true)]
    pub invert_circle_filled: Vec<i32>,

    /// Start the driver and record its PID
    #[arg(long)]
    pub start_lcd: bool,

    /// Stop the driver recorded in the PID file
    #[arg(long)]
    pub kill_lcd: bool,

    /// Print the glyph store in hex when done
    #[arg(long)]
    pub dump_store: bool,

    /// Remove the shared-memory store when done
    #[arg(long)]
    pub unlink_store: bool,
}

/// One command-line action, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Draw(DrawOp),
    StartDriver,
    StopDriver,
}

impl EditorArgs {
    /// Actions in command-line order
    ///
    /// `matches` must be the matches these arguments were built from.
    pub fn steps(&self, matches: &ArgMatches) -> Result<Vec<Step>, CliError> {
        let mut steps: Vec<(usize, Step)> = Vec::new();

        for (flag, set, step) in [
            ("clear", self.clear, Step::Draw(DrawOp::Clear)),
            ("start_lcd", self.start_lcd, Step::StartDriver),
            ("kill_lcd", self.kill_lcd, Step::StopDriver),
        ] {
            if let Some(index) = matches.index_of(flag).filter(|_| set) {
                steps.push((index, step));
            }
        }

        for (index, path) in occurrences(matches, "font", &self.font, 1) {
            steps.push((index, Step::Draw(DrawOp::Font(path[0].clone()))));
        }

        for (index, values) in occurrences(matches, "text", &self.text, 3) {
            let op = DrawOp::Text {
                x: integer("text", &values[0])?,
                y: integer("text", &values[1])?,
                text: values[2].clone(),
            };
            steps.push((index, Step::Draw(op)));
        }

        for (index, values) in occurrences(matches, "scroll_text", &self.scroll_text, 4) {
            let step_ms = values[1]
                .trim()
                .parse::<u64>()
                .map_err(|_| CliError::InvalidNumber {
                    flag: "scroll-text",
                    value: values[1].clone(),
                })?;
            let op = DrawOp::ScrollText {
                y: integer("scroll-text", &values[0])?,
                step: Duration::from_millis(step_ms),
                text: values[2].clone(),
                direction: ScrollDirection::from_code(integer("scroll-text", &values[3])?),
            };
            steps.push((index, Step::Draw(op)));
        }

        let lines = [
            ("line", &self.line, DrawMode::Set),
            ("invert_line", &self.invert_line, DrawMode::Invert),
        ];
        for (id, values, mode) in lines {
            for (index, v) in occurrences(matches, id, values, 4) {
                let op = DrawOp::Line {
                    from: (v[0], v[1]),
                    to: (v[2], v[3]),
                    mode,
                };
                steps.push((index, Step::Draw(op)));
            }
        }

        let rects = [
            ("rect", &self.rect, Fill::Outline, DrawMode::Set),
            ("invert_rect", &self.invert_rect, Fill::Outline, DrawMode::Invert),
            ("rect_filled", &self.rect_filled, Fill::Filled, DrawMode::Set),
            ("invert_rect_filled", &self.invert_rect_filled, Fill::Filled, DrawMode::Invert),
        ];
        for (id, values, fill, mode) in rects {
            for (index, v) in occurrences(matches, id, values, 4) {
                let op = DrawOp::Rect {
                    x: v[0],
                    y: v[1],
                    w: v[2],
                    h: v[3],
                    fill,
                    mode,
                };
                steps.push((index, Step::Draw(op)));
            }
        }

        let circles = [
            ("circle", &self.circle, Fill::Outline, DrawMode::Set),
            ("invert_circle", &self.invert_circle, Fill::Outline, DrawMode::Invert),
            ("circle_filled", &self.circle_filled, Fill::Filled, DrawMode::Set),
            ("invert_circle_filled", &self.invert_circle_filled, Fill::Filled, DrawMode::Invert),
        ];
        for (id, values, fill, mode) in circles {
            for (index, v) in occurrences(matches, id, values, 3) {
                let op = DrawOp::Circle {
                    xc: v[0],
                    yc: v[1],
                    r: v[2],
                    fill,
                    mode,
                };
                steps.push((index, Step::Draw(op)));
            }
        }

        steps.sort_by_key(|&(index, _)| index);
        Ok(steps.into_iter().map(|(_, step)| step).collect())
    }
}

/// Pair each occurrence of a multi-value flag with its values
fn occurrences<'a, T>(
    matches: &'a ArgMatches,
    id: &str,
    values: &'a [T],
    arity: usize,
) -> impl Iterator<Item = (usize, &'a [T])> {
    matches
        .indices_of(id)
        .into_iter()
        .flatten()
        .step_by(arity)
        .zip(values.chunks_exact(arity))
}

fn integer(flag: &'static str, value: &str) -> Result<i32, CliError> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidNumber {
            flag,
            value: value.to_owned(),
        })
}
