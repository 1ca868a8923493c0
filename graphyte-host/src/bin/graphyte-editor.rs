//! Editor: draws into the shared glyph store and supervises the driver

use std::io;

use clap::{CommandFactory, FromArgMatches};
use color_eyre::eyre::{Context, Result};
use graphyte_hal_linux::{unlink, SharedGlyphStore};
use graphyte_host::cli::driver_args;
use graphyte_host::editor::{write_store_hex, DrawOp};
use graphyte_host::{init_logging, Config, Editor, EditorArgs, LoggingConfig, Step, Supervisor};

fn main() -> Result<()> {
    // panic hook
    color_eyre::install()?;

    init_logging(LoggingConfig::from_env()).wrap_err("Failed to initialize logging")?;

    let matches = EditorArgs::command().get_matches();
    let args = EditorArgs::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let steps = args.steps(&matches)?;

    let config = Config::load(args.config.as_deref()).wrap_err("Failed to load configuration")?;
    let supervisor = Supervisor::new(&config.driver.program, &config.driver.pid_file)
        .with_args(driver_args(args.config.as_deref()));

    let store = SharedGlyphStore::open(&config.store.name)
        .wrap_err("Failed to open the glyph store")?;
    let mut editor = Editor::new(store, io::stdout().lock()).with_debug(args.debug);

    for step in &steps {
        match step {
            Step::Draw(op) => editor.apply(op)?,
            Step::StartDriver => {
                // The editor clears in the driver's place so that later
                // operations survive the driver's startup
                if config.store.clear_on_start {
                    editor.apply(&DrawOp::Clear)?;
                    editor.flush()?;
                }
                let pid = supervisor.start()?;
                println!("Started {} with PID {pid}", supervisor.program().display());
            }
            Step::StopDriver => {
                supervisor.stop_and_report(&mut io::stdout(), &mut io::stderr())?;
            }
        }
    }

    let (store, _) = editor.finish()?;

    if args.dump_store {
        write_store_hex(&store.load(), &mut io::stdout().lock())?;
    }

    if args.unlink_store {
        let name = store.name().to_owned();
        drop(store);
        unlink(&name).wrap_err("Failed to remove the glyph store")?;
        tracing::info!(store = %name, "glyph store removed");
    }

    Ok(())
}
