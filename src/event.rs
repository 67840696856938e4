//! Application events for the tao event loop.

use crate::MuteState;

/// Events sent to the tao event loop from the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicMuteEvent {
    /// The committed mute state has changed
    StateChanged(MuteState),
}
