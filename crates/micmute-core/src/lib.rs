//! Core types and configuration for micmute.
//!
//! This crate provides the platform-agnostic pieces: the normalized mute
//! state, the presentation mapping, and configuration. Nothing in here does
//! I/O against the audio subsystem or the desktop shell.

mod config;
mod present;
mod state;

pub use config::{Config, ConfigError, ConfigManager};
pub use present::{StatusPresenter, Visual};
pub use state::{Encoding, MuteState};

/// Application name
pub const APP_NAME: &str = "micmute";

/// Pretty application name for display
pub const APP_NAME_PRETTY: &str = "MicMute";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "MICMUTE_LOG";
