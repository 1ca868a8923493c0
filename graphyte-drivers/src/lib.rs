//! Hardware drivers for the Graphyte LCD
//!
//! - HD44780 character LCD on a 4-bit parallel bus
//! - Interlace scheduler cycling the four glyph sets through CGRAM
//!
//! Both are generic over `embedded-hal` pins and delays, so the same code
//! runs against sysfs GPIO on Linux and against mocks in tests.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod hd44780;
pub mod interlacer;

pub use hd44780::{BusError, BusLine, BusTiming, Hd44780, Hd44780Pins};
pub use interlacer::{Interlacer, DEFAULT_INTERVAL_NS};
