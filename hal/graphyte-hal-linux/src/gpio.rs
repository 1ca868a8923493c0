//! Sysfs GPIO output pins
//!
//! Pins are requested from a [`SysfsGpio`] bank by number at runtime, so
//! the pin map can come from the config file. Each pin is exported on
//! first use, switched to output, and then driven by rewriting its `value`
//! file in place.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use graphyte_drivers::Hd44780Pins;
use tracing::debug;

/// Default sysfs GPIO class directory
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

/// Errors raised while setting up or driving a pin
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// The pin was already handed out by this bank
    #[error("GPIO {pin} is already in use")]
    AlreadyTaken { pin: u32 },

    /// Writing the export file failed
    #[error("failed to export GPIO {pin}")]
    Export {
        pin: u32,
        #[source]
        source: io::Error,
    },

    /// The direction file could not be set to `out`
    #[error("failed to make GPIO {pin} an output")]
    Direction {
        pin: u32,
        #[source]
        source: io::Error,
    },

    /// The value file could not be opened or written
    #[error("failed to drive GPIO {pin}")]
    Value {
        pin: u32,
        #[source]
        source: io::Error,
    },
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Bank of sysfs GPIO lines
#[derive(Debug)]
pub struct SysfsGpio {
    root: PathBuf,
    /// Added to every pin number to get the kernel line number
    base: u32,
    taken: BTreeSet<u32>,
}

impl SysfsGpio {
    /// Create a bank rooted at `root` (normally [`DEFAULT_SYSFS_ROOT`])
    pub fn new(root: impl Into<PathBuf>, base: u32) -> Self {
        Self {
            root: root.into(),
            base,
            taken: BTreeSet::new(),
        }
    }

    /// Sysfs directory of the bank
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Export a pin and configure it as an output
    pub fn output(&mut self, pin: u32) -> Result<SysfsPin, GpioError> {
        if !self.taken.insert(pin) {
            return Err(GpioError::AlreadyTaken { pin });
        }

        let line = self.base + pin;
        let dir = self.root.join(format!("gpio{line}"));
        if !dir.exists() {
            fs::write(self.root.join("export"), line.to_string())
                .map_err(|source| GpioError::Export { pin, source })?;
        }
        fs::write(dir.join("direction"), "out")
            .map_err(|source| GpioError::Direction { pin, source })?;

        let value = OpenOptions::new()
            .write(true)
            .open(dir.join("value"))
            .map_err(|source| GpioError::Value { pin, source })?;

        debug!(pin, line, "GPIO configured as output");
        Ok(SysfsPin { pin, value })
    }

    /// Request the six bus pins at once
    pub fn bus(
        &mut self,
        rs: u32,
        enable: u32,
        data: [u32; 4],
    ) -> Result<Hd44780Pins<SysfsPin>, GpioError> {
        Ok(Hd44780Pins {
            rs: self.output(rs)?,
            enable: self.output(enable)?,
            data: [
                self.output(data[0])?,
                self.output(data[1])?,
                self.output(data[2])?,
                self.output(data[3])?,
            ],
        })
    }
}

/// One exported output line
#[derive(Debug)]
pub struct SysfsPin {
    pin: u32,
    value: File,
}

impl SysfsPin {
    /// Pin number as requested from the bank
    pub fn pin(&self) -> u32 {
        self.pin
    }

    fn write_level(&mut self, level: &[u8]) -> Result<(), GpioError> {
        self.value
            .write_at(level, 0)
            .map(drop)
            .map_err(|source| GpioError::Value {
                pin: self.pin,
                source,
            })
    }
}

impl ErrorType for SysfsPin {
    type Error = GpioError;
}

impl OutputPin for SysfsPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_level(b"0")
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_level(b"1")
    }
}
