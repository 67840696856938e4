// Re-export from sub-crates
pub use micmute_core::{
    APP_NAME, APP_NAME_PRETTY, Config, ConfigManager, DEFAULT_LOG_LEVEL, LOG_ENV, MuteState,
    StatusPresenter, Visual,
};
pub use micmute_poll::{CommandSource, MicStatusSource, PollerError, QueryError, StatusPoller};

// App-specific modules
mod color;
pub mod event;
pub mod icon;
pub mod notify;
pub mod poll;

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
