//! HD44780 instruction set
//!
//! Instructions are single bytes sent with the register-select line low.
//! Data bytes (characters, CGRAM rows) are sent with register-select high.
//! On a 4-bit bus every byte travels as two nibbles, high nibble first.

/// Instruction bytes and their flag bits
pub mod cmd {
    /// Clear display and return home (slow: needs ~1.5 ms)
    pub const CLEAR_DISPLAY: u8 = 0x01;
    /// Return cursor home
    pub const RETURN_HOME: u8 = 0x02;

    /// Entry mode set
    pub const ENTRY_MODE_SET: u8 = 0x04;
    /// Entry mode: increment address after each write
    pub const ENTRY_INCREMENT: u8 = 0x02;
    /// Entry mode: shift the display on write
    pub const ENTRY_SHIFT: u8 = 0x01;

    /// Display on/off control
    pub const DISPLAY_CONTROL: u8 = 0x08;
    /// Display control: display on
    pub const DISPLAY_ON: u8 = 0x04;
    /// Display control: cursor visible
    pub const CURSOR_ON: u8 = 0x02;
    /// Display control: cursor blinks
    pub const BLINK_ON: u8 = 0x01;

    /// Function set
    pub const FUNCTION_SET: u8 = 0x20;
    /// Function set: 8-bit interface
    pub const DATA_LENGTH_8BIT: u8 = 0x10;
    /// Function set: two display lines
    pub const TWO_LINES: u8 = 0x08;
    /// Function set: 5x10 dot font (unset = 5x8)
    pub const FONT_5X10: u8 = 0x04;

    /// Set CGRAM address (OR with the 6-bit address)
    pub const SET_CGRAM_ADDR: u8 = 0x40;
    /// Set DDRAM address (OR with the 7-bit address)
    pub const SET_DDRAM_ADDR: u8 = 0x80;
}

/// Initialization sequence for 4-bit operation
///
/// `0x33` and `0x32` are the legacy 8-bit-mode writes that walk the
/// controller into 4-bit mode regardless of its power-on state. They are
/// followed by function set (2 lines, 5x8), display control (display on,
/// cursor and blink off) and entry mode (increment, no shift).
pub const INIT_SEQUENCE: [u8; 5] = [
    0x33,
    0x32,
    cmd::FUNCTION_SET | cmd::TWO_LINES,
    cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON,
    cmd::ENTRY_MODE_SET | cmd::ENTRY_INCREMENT,
];

/// Number of DDRAM bytes in 2-line mode (40 per line)
pub const DDRAM_SIZE: usize = 80;

/// Number of CGRAM glyph slots
pub const CGRAM_SLOTS: usize = 8;

/// Register-select state for a byte transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Instruction register (RS low)
    Command,
    /// Data register (RS high)
    Data,
}

impl Mode {
    /// Level of the register-select line for this mode
    pub const fn rs_high(self) -> bool {
        matches!(self, Mode::Data)
    }
}

/// A display line, addressed through DDRAM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayLine {
    /// First line (DDRAM 0x00)
    #[default]
    First,
    /// Second line (DDRAM 0x40)
    Second,
}

impl DisplayLine {
    /// Set-DDRAM-address instruction that moves the cursor to column 0
    pub const fn command(self) -> u8 {
        match self {
            DisplayLine::First => cmd::SET_DDRAM_ADDR,
            DisplayLine::Second => cmd::SET_DDRAM_ADDR | 0x40,
        }
    }
}

/// Set-CGRAM-address instruction for the first row of a glyph slot
///
/// Slots wrap modulo 8 like the hardware does.
pub const fn cgram_address(slot: u8) -> u8 {
    cmd::SET_CGRAM_ADDR | ((slot & 0x07) << 3)
}

/// Split a byte into the two nibbles sent on D4-D7, high nibble first
///
/// Each nibble is returned in the low 4 bits (bit 0 = D4).
pub const fn nibbles(byte: u8) -> [u8; 2] {
    [byte >> 4, byte & 0x0F]
}

/// Levels of the four data lines D4..D7 for a nibble
pub const fn data_lines(nibble: u8) -> [bool; 4] {
    [
        nibble & 0x01 != 0,
        nibble & 0x02 != 0,
        nibble & 0x04 != 0,
        nibble & 0x08 != 0,
    ]
}
