//! Monotonic clock and busy-wait delays
//!
//! Both read `CLOCK_MONOTONIC`. The delay spins on the clock and never
//! sleeps, so a byte on the bus is never interrupted by a yield.

use embedded_hal::delay::DelayNs;
use graphyte_core::Monotonic;
use rustix::time::{clock_gettime, ClockId, Timespec};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Current `CLOCK_MONOTONIC` time in nanoseconds
pub fn now_ns() -> u64 {
    timespec_to_nanos(clock_gettime(ClockId::Monotonic))
}

fn timespec_to_nanos(timespec: Timespec) -> u64 {
    let seconds = u64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(timespec.tv_nsec)
        .unwrap_or(0)
        .min(NANOS_PER_SECOND - 1);
    seconds
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(nanos)
}

/// `CLOCK_MONOTONIC` as a [`Monotonic`] source
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Monotonic for MonotonicClock {
    fn now_ns(&self) -> u64 {
        now_ns()
    }
}

/// Busy-wait delay on `CLOCK_MONOTONIC`
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl SpinDelay {
    /// Spin until `ns` nanoseconds have passed
    pub fn spin(ns: u64) {
        let start = now_ns();
        while now_ns().saturating_sub(start) < ns {
            core::hint::spin_loop();
        }
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        Self::spin(u64::from(ns));
    }
}
