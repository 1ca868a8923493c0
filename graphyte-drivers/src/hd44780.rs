//! HD44780 4-bit parallel bus driver
//!
//! Drives six lines (RS, E, D4-D7). Every byte is sent as two nibbles, high
//! nibble first, each latched by an enable pulse. The controller's busy flag
//! is never read; fixed delays cover the execution time instead.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use graphyte_protocol::instruction::{cmd, data_lines, nibbles};
use graphyte_protocol::{cgram_address, DisplayLine, Mode, DDRAM_SIZE, INIT_SEQUENCE};

/// Enable-pulse and settle timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// Time E is held high per nibble
    pub enable_pulse_ns: u32,
    /// Time after E falls before the next nibble
    pub enable_settle_ns: u32,
    /// Wait after the clear-display instruction
    pub clear_settle_ns: u32,
}

impl Default for BusTiming {
    fn default() -> Self {
        Self {
            enable_pulse_ns: 38_000,
            enable_settle_ns: 1,
            clear_settle_ns: 2_000_000,
        }
    }
}

/// One of the six bus lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusLine {
    /// Register select
    Rs,
    /// Enable strobe
    Enable,
    /// Data line D4-D7 (index 0-3)
    Data(u8),
}

/// Bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<E> {
    /// A pin could not be driven
    Pin {
        /// Line that failed
        line: BusLine,
        /// Error reported by the pin
        error: E,
    },
}

impl<E: fmt::Debug> fmt::Display for BusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Pin { line, error } => {
                write!(f, "failed to drive {line:?}: {error:?}")
            }
        }
    }
}

impl<E: fmt::Debug> core::error::Error for BusError<E> {}

/// The six output pins of the bus
#[derive(Debug)]
pub struct Hd44780Pins<P> {
    /// Register select
    pub rs: P,
    /// Enable strobe
    pub enable: P,
    /// D4, D5, D6, D7
    pub data: [P; 4],
}

/// HD44780 driver on a 4-bit bus
pub struct Hd44780<P, D> {
    pins: Hd44780Pins<P>,
    delay: D,
    timing: BusTiming,
}

type BusResult<P> = Result<(), BusError<<P as embedded_hal::digital::ErrorType>::Error>>;

fn drive<P: OutputPin>(pin: &mut P, line: BusLine, high: bool) -> BusResult<P> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|error| BusError::Pin { line, error })
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Create a driver; nothing is sent until [`init`](Self::init)
    pub fn new(pins: Hd44780Pins<P>, delay: D, timing: BusTiming) -> Self {
        Self {
            pins,
            delay,
            timing,
        }
    }

    /// Timing in use
    pub fn timing(&self) -> BusTiming {
        self.timing
    }

    /// Take the pins and delay back
    pub fn release(self) -> (Hd44780Pins<P>, D) {
        (self.pins, self.delay)
    }

    /// Latch the levels on D4-D7
    fn pulse_enable(&mut self) -> BusResult<P> {
        drive(&mut self.pins.enable, BusLine::Enable, true)?;
        self.delay.delay_ns(self.timing.enable_pulse_ns);
        drive(&mut self.pins.enable, BusLine::Enable, false)?;
        self.delay.delay_ns(self.timing.enable_settle_ns);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8) -> BusResult<P> {
        for (i, (pin, high)) in self
            .pins
            .data
            .iter_mut()
            .zip(data_lines(nibble))
            .enumerate()
        {
            drive(pin, BusLine::Data(i as u8), high)?;
        }
        self.pulse_enable()
    }

    /// Send one byte to the instruction or data register
    pub fn write_byte(&mut self, byte: u8, mode: Mode) -> BusResult<P> {
        drive(&mut self.pins.rs, BusLine::Rs, mode.rs_high())?;
        for nibble in nibbles(byte) {
            self.write_nibble(nibble)?;
        }
        Ok(())
    }

    /// Send an instruction
    pub fn command(&mut self, byte: u8) -> BusResult<P> {
        self.write_byte(byte, Mode::Command)
    }

    /// Send a data byte (character code or CGRAM row)
    pub fn write_data(&mut self, byte: u8) -> BusResult<P> {
        self.write_byte(byte, Mode::Data)
    }

    /// Send a run of data bytes at the cursor
    pub fn write_bytes(&mut self, bytes: &[u8]) -> BusResult<P> {
        bytes.iter().try_for_each(|&b| self.write_data(b))
    }

    /// Put the controller in 4-bit, 2-line mode and blank DDRAM
    pub fn init(&mut self) -> BusResult<P> {
        for byte in INIT_SEQUENCE {
            self.command(byte)?;
        }
        self.blank()
    }

    /// Overwrite all 80 DDRAM cells with spaces from the cursor
    ///
    /// Much faster than [`clear`](Self::clear); the cursor wraps back to
    /// where it started.
    pub fn blank(&mut self) -> BusResult<P> {
        for _ in 0..DDRAM_SIZE {
            self.write_data(b' ')?;
        }
        Ok(())
    }

    /// Clear-display instruction followed by its settle time
    pub fn clear(&mut self) -> BusResult<P> {
        self.command(cmd::CLEAR_DISPLAY)?;
        self.delay.delay_ns(self.timing.clear_settle_ns);
        Ok(())
    }

    /// Move the cursor to column 0 of a line
    pub fn set_line(&mut self, line: DisplayLine) -> BusResult<P> {
        self.command(line.command())
    }

    /// Program a CGRAM slot and move the cursor back to `restore`
    ///
    /// Slot numbers wrap modulo 8.
    pub fn create_char(
        &mut self,
        slot: u8,
        rows: &[u8; 8],
        restore: DisplayLine,
    ) -> BusResult<P> {
        self.command(cgram_address(slot))?;
        self.write_bytes(rows)?;
        self.set_line(restore)
    }
}
