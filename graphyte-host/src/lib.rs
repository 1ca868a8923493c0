//! Graphyte host application
//!
//! Shared pieces of the two binaries:
//!
//! - `graphyte-lcd`: owns the GPIO bus and interlaces the glyph store
//! - `graphyte-editor`: draws into the glyph store and supervises the driver

pub mod cli;
pub mod config;
pub mod editor;
pub mod logging;
pub mod supervisor;

pub use cli::{CliError, DriverArgs, EditorArgs, Step};
pub use config::{Config, ConfigError};
pub use editor::{DrawOp, Editor, EditorError, Fill, FrameSink};
pub use logging::{init_logging, LoggingConfig};
pub use supervisor::{Supervisor, SupervisorError};
