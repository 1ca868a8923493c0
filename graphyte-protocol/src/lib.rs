//! Graphyte display protocol
//!
//! This crate defines the two byte-level contracts of the system:
//!
//! - The HD44780 instruction set spoken by the driver over the 4-bit bus
//! - The layout of the shared glyph store written by the composer and read
//!   by the driver
//!
//! # Glyph Store Overview
//!
//! ```text
//! ┌────────┬────────┬────────┬────────┐
//! │ set 0  │ set 1  │ set 2  │ set 3  │   4 x 64 bytes
//! └────────┴────────┴────────┴────────┘
//!     │
//!     ▼
//! ┌─────────┬─────────┬─────┬─────────┐
//! │ glyph 0 │ glyph 1 │ ... │ glyph 7 │   8 x 8 row bytes
//! └─────────┴─────────┴─────┴─────────┘
//! ```
//!
//! Nothing in the store is locked or versioned; both processes read and
//! write it whenever they like.

#![no_std]
#![deny(unsafe_code)]

pub mod glyph;
pub mod instruction;

pub use glyph::{
    Glyph, GlyphSet, GlyphStore, LayoutError, GLYPHS_PER_SET, GLYPH_COLUMNS, ROWS_PER_GLYPH,
    ROW_MASK, SET_COUNT, STORE_SIZE,
};
pub use instruction::{cgram_address, DisplayLine, Mode, CGRAM_SLOTS, DDRAM_SIZE, INIT_SEQUENCE};
