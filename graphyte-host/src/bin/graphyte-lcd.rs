//! LCD driver: interlaces the shared glyph store onto the panel forever

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use graphyte_core::Forever;
use graphyte_drivers::{Hd44780, Interlacer};
use graphyte_hal_linux::{MonotonicClock, SharedGlyphStore, SpinDelay, SysfsGpio};
use graphyte_host::{init_logging, Config, DriverArgs, LoggingConfig};

/// Frames between heartbeat log lines
const HEARTBEAT_FRAMES: u64 = 256;

fn main() -> Result<()> {
    // panic hook
    color_eyre::install()?;

    init_logging(LoggingConfig::from_env()).wrap_err("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "graphyte-lcd starting up"
    );

    let args = DriverArgs::parse();
    let config = Config::load(args.config.as_deref()).wrap_err("Failed to load configuration")?;

    let store = SharedGlyphStore::open(&config.store.name)
        .wrap_err("Failed to open the glyph store")?;
    if config.store.clear_on_start && !args.keep_store {
        store.zero();
    }

    let sysfs_root = args.sysfs_root.unwrap_or(config.gpio.sysfs_root);
    let mut gpio = SysfsGpio::new(sysfs_root, config.gpio.base);
    tracing::debug!(
        sysfs_root = %gpio.root().display(),
        base = config.gpio.base,
        "GPIO bank"
    );
    let pins = gpio
        .bus(config.gpio.rs, config.gpio.enable, config.gpio.data)
        .wrap_err("Failed to set up the LCD bus")?;

    let lcd = Hd44780::new(pins, SpinDelay, config.timing.bus());
    let mut interlacer = Interlacer::new(lcd, &store, MonotonicClock, config.timing.interval_ns());
    interlacer.start().wrap_err("Failed to initialise the LCD")?;

    tracing::info!(
        store = store.name(),
        interval_ms = config.timing.interlace_ms,
        "LCD initialised, interlacing"
    );

    interlacer
        .run_with(&Forever, |state, frames| {
            if frames % HEARTBEAT_FRAMES == 0 {
                tracing::debug!(frames, next_set = state.frame_index(), "interlacing");
            }
        })
        .wrap_err("LCD bus failure")?;

    Ok(())
}
