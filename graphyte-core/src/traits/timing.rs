//! Clock and stop-signal traits for the interlace run loop

use core::sync::atomic::{AtomicBool, Ordering};

/// Monotonic nanosecond clock
pub trait Monotonic {
    /// Nanoseconds since an arbitrary fixed origin
    fn now_ns(&self) -> u64;
}

/// Checked by the run loop between polls
pub trait StopSignal {
    /// Return true to leave the loop
    fn should_stop(&self) -> bool;
}

/// Never stops (production default)
#[derive(Debug, Clone, Copy, Default)]
pub struct Forever;

impl StopSignal for Forever {
    fn should_stop(&self) -> bool {
        false
    }
}

/// Stops once the flag is raised, e.g. from a signal handler
impl StopSignal for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: StopSignal + ?Sized> StopSignal for &T {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}
