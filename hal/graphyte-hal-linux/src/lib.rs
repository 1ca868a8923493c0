//! Linux HAL for the Graphyte LCD
//!
//! This crate provides Linux implementations of the traits the drivers
//! are generic over:
//!
//! - GPIO output pins through the sysfs class interface
//! - Busy-wait delays and a monotonic clock (`CLOCK_MONOTONIC`)
//! - The glyph store as a named POSIX shared-memory segment
//!
//! Only the shared-memory mapping uses `unsafe`.

#![deny(unsafe_code)]

pub mod gpio;
pub mod shm;
pub mod timing;

pub use gpio::{GpioError, SysfsGpio, SysfsPin, DEFAULT_SYSFS_ROOT};
pub use shm::{unlink, SharedGlyphStore, ShmError, DEFAULT_SHM_NAME};
pub use timing::{MonotonicClock, SpinDelay};
