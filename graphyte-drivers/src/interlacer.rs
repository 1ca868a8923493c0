//! Interlace scheduler
//!
//! Every interval the interlacer blanks the panel, uploads the next glyph
//! set into CGRAM and prints the index line for that set. The glyph source
//! is read one glyph at a time, so concurrent writers are tolerated (a torn
//! set is visible for one frame at most).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use graphyte_core::interlace::InterlaceState;
use graphyte_core::traits::{GlyphSource, Monotonic, StopSignal};
use graphyte_protocol::CGRAM_SLOTS;

use crate::hd44780::{BusError, Hd44780};

/// Default interval between frames
pub const DEFAULT_INTERVAL_NS: u64 = 31_000_000;

type TickResult<P, T> = Result<T, BusError<<P as ErrorType>::Error>>;

/// Drives the HD44780 through the four glyph sets
pub struct Interlacer<P, D, S, C> {
    lcd: Hd44780<P, D>,
    source: S,
    clock: C,
    state: InterlaceState,
    interval_ns: u64,
    last_update: u64,
    frames: u64,
}

impl<P, D, S, C> Interlacer<P, D, S, C>
where
    P: OutputPin,
    D: DelayNs,
    S: GlyphSource,
    C: Monotonic,
{
    /// Create an interlacer; the panel is untouched until [`start`](Self::start)
    pub fn new(lcd: Hd44780<P, D>, source: S, clock: C, interval_ns: u64) -> Self {
        let last_update = clock.now_ns();
        Self {
            lcd,
            source,
            clock,
            state: InterlaceState::new(),
            interval_ns,
            last_update,
            frames: 0,
        }
    }

    /// Initialise the controller and clear the panel
    pub fn start(&mut self) -> TickResult<P, ()> {
        self.lcd.init()?;
        self.lcd.clear()?;
        self.last_update = self.clock.now_ns();
        Ok(())
    }

    /// Current animation state
    pub fn state(&self) -> &InterlaceState {
        &self.state
    }

    /// Frames shown since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Show the next frame immediately
    pub fn tick(&mut self) -> TickResult<P, ()> {
        self.lcd.blank()?;

        let set = self.state.frame_index();
        let restore = self.state.restore_line();
        for slot in 0..CGRAM_SLOTS {
            let glyph = self.source.read_glyph(set, slot).masked();
            self.lcd.create_char(slot as u8, &glyph.rows, restore)?;
        }

        self.lcd.write_bytes(&self.state.index_line())?;
        self.state.advance();
        self.frames += 1;
        Ok(())
    }

    /// Show a frame if the interval has elapsed
    ///
    /// Returns whether a frame was shown.
    pub fn poll(&mut self) -> TickResult<P, bool> {
        let now = self.clock.now_ns();
        if now.saturating_sub(self.last_update) < self.interval_ns {
            return Ok(false);
        }
        self.tick()?;
        self.last_update = now;
        Ok(true)
    }

    /// Poll until `stop` is raised
    ///
    /// Returns the number of frames shown.
    pub fn run<T: StopSignal>(&mut self, stop: &T) -> TickResult<P, u64> {
        self.run_with(stop, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `on_frame` after every frame with the
    /// state for the next frame and the frame count
    pub fn run_with<T, F>(&mut self, stop: &T, mut on_frame: F) -> TickResult<P, u64>
    where
        T: StopSignal,
        F: FnMut(&InterlaceState, u64),
    {
        let first = self.frames;
        while !stop.should_stop() {
            if self.poll()? {
                on_frame(&self.state, self.frames);
            }
        }
        Ok(self.frames - first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hd44780::tests::{mock_driver, Bus};
    use core::cell::Cell;
    use core::sync::atomic::AtomicBool;
    use graphyte_protocol::{DisplayLine, Glyph, GlyphStore, Mode, DDRAM_SIZE};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    /// Advances by a fixed step on every read
    struct SteppingClock {
        now: Cell<u64>,
        step: u64,
    }

    impl Monotonic for SteppingClock {
        fn now_ns(&self) -> u64 {
            let now = self.now.get();
            self.now.set(now + self.step);
            now
        }
    }

    /// Stops after a number of checks
    struct StopAfter(Cell<u32>);

    impl StopSignal for StopAfter {
        fn should_stop(&self) -> bool {
            let left = self.0.get();
            self.0.set(left.saturating_sub(1));
            left == 0
        }
    }

    fn store() -> GlyphStore {
        let mut store = GlyphStore::new();
        for set in 0..4 {
            for slot in 0..8 {
                // Distinct pattern per glyph, with junk in the upper bits
                let pattern = 0xE0 | (set * 8 + slot) as u8;
                *store.glyph_mut(set, slot) = Glyph::new([pattern; 8]);
            }
        }
        store
    }

    fn frame_bytes(bus: &Rc<RefCell<Bus>>) -> Vec<(Mode, u8)> {
        let bytes = bus.borrow().bytes();
        bus.borrow_mut().latched.clear();
        bytes
    }

    fn check_frame(bytes: &[(Mode, u8)], set: usize, restore: u8, code_first: bool) {
        // Blank, 8 x (address + 8 rows + restore), 18 index bytes
        assert_eq!(bytes.len(), DDRAM_SIZE + 8 * 10 + 18);
        assert!(bytes[..DDRAM_SIZE].iter().all(|&b| b == (Mode::Data, b' ')));

        for slot in 0..8 {
            let upload = &bytes[DDRAM_SIZE + slot * 10..DDRAM_SIZE + (slot + 1) * 10];
            assert_eq!(upload[0], (Mode::Command, 0x40 | (slot as u8) << 3));
            let expected = (set * 8 + slot) as u8 & 0x1F;
            assert!(upload[1..9].iter().all(|&b| b == (Mode::Data, expected)));
            assert_eq!(upload[9], (Mode::Command, restore));
        }

        let index: Vec<u8> = bytes[DDRAM_SIZE + 80..].iter().map(|&(_, b)| b).collect();
        if code_first {
            assert_eq!(&index[..4], &[1, b' ', 2, b' ']);
        } else {
            assert_eq!(&index[..4], &[b' ', 1, b' ', 2]);
        }
    }

    #[test]
    fn test_four_ticks_cycle_sets() {
        let (lcd, bus, _) = mock_driver();
        let clock = SteppingClock {
            now: Cell::new(0),
            step: 0,
        };
        let mut interlacer = Interlacer::new(lcd, store(), clock, DEFAULT_INTERVAL_NS);

        let expected = [
            (0, 0x80, true),
            (1, 0x80, false),
            (2, 0xC0, true),
            (3, 0xC0, false),
            (0, 0x80, true),
        ];
        for (set, restore, code_first) in expected {
            assert_eq!(interlacer.state().frame_index(), set);
            interlacer.tick().unwrap();
            check_frame(&frame_bytes(&bus), set, restore, code_first);
        }
        assert_eq!(interlacer.frames(), 5);
        assert_eq!(interlacer.state().restore_line(), DisplayLine::First);
    }

    #[test]
    fn test_start_initialises_and_clears() {
        let (lcd, bus, delay) = mock_driver();
        let clock = SteppingClock {
            now: Cell::new(0),
            step: 1,
        };
        let mut interlacer =
            Interlacer::new(lcd, GlyphStore::new(), clock, DEFAULT_INTERVAL_NS);
        interlacer.start().unwrap();

        let bytes = frame_bytes(&bus);
        assert_eq!(bytes[0], (Mode::Command, 0x33));
        assert_eq!(bytes.last(), Some(&(Mode::Command, 0x01)));
        assert_eq!(delay.calls.borrow().last(), Some(&2_000_000));
        assert_eq!(interlacer.frames(), 0);
    }

    #[test]
    fn test_poll_respects_interval() {
        let (lcd, _, _) = mock_driver();
        let clock = SteppingClock {
            now: Cell::new(0),
            step: 10_000_000,
        };
        let mut interlacer = Interlacer::new(lcd, store(), clock, DEFAULT_INTERVAL_NS);

        // Created at 0; polls read 10, 20, 30, 40 ms
        assert!(!interlacer.poll().unwrap());
        assert!(!interlacer.poll().unwrap());
        assert!(!interlacer.poll().unwrap());
        assert!(interlacer.poll().unwrap());
        assert_eq!(interlacer.frames(), 1);
        // Next frame due at 71 ms
        assert!(!interlacer.poll().unwrap());
        assert!(!interlacer.poll().unwrap());
        assert!(!interlacer.poll().unwrap());
        assert!(interlacer.poll().unwrap());
    }

    #[test]
    fn test_run_until_stopped() {
        let (lcd, _, _) = mock_driver();
        let clock = SteppingClock {
            now: Cell::new(0),
            step: DEFAULT_INTERVAL_NS,
        };
        let mut interlacer = Interlacer::new(lcd, store(), clock, DEFAULT_INTERVAL_NS);

        let mut seen = Vec::new();
        let frames = interlacer
            .run_with(&StopAfter(Cell::new(6)), |state, count| {
                seen.push((state.frame_index(), count));
            })
            .unwrap();

        assert_eq!(frames, 6);
        assert_eq!(seen, [(1, 1), (2, 2), (3, 3), (0, 4), (1, 5), (2, 6)]);

        let stopped = AtomicBool::new(true);
        assert_eq!(interlacer.run(&stopped).unwrap(), 0);
        assert_eq!(interlacer.frames(), 6);
    }
}
