//! Microphone mute state and normalization of raw status encodings.

/// The normalized mute state of the default capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MuteState {
    /// The microphone is muted
    Muted,
    /// The microphone is live. Also the state before any observation exists.
    #[default]
    Unmuted,
}

impl MuteState {
    pub fn is_muted(self) -> bool {
        matches!(self, MuteState::Muted)
    }
}

impl From<bool> for MuteState {
    fn from(muted: bool) -> Self {
        if muted {
            MuteState::Muted
        } else {
            MuteState::Unmuted
        }
    }
}

/// Classification of a raw status string returned by a status source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Muted,
    Unmuted,
    /// Not a known encoding. Treated as unmuted so the indicator never
    /// raises a false alarm.
    Unrecognized,
}

const MUTED: &[&str] = &["true", "yes", "1", "on", "muted"];
const UNMUTED: &[&str] = &["false", "no", "0", "off", "unmuted"];

impl Encoding {
    /// Classify a raw encoding. Matching is case-insensitive, ignores
    /// surrounding whitespace and accepts an optional `mute:` label, which is
    /// how `pactl get-source-mute` prints its answer.
    pub fn classify(raw: &str) -> Self {
        let value = raw.trim().to_ascii_lowercase();
        let value = match value.strip_prefix("mute:") {
            Some(rest) => rest.trim(),
            None => value.as_str(),
        };

        if MUTED.contains(&value) {
            Encoding::Muted
        } else if UNMUTED.contains(&value) {
            Encoding::Unmuted
        } else {
            Encoding::Unrecognized
        }
    }

    /// The normalized state. Anything that is not a recognized muted
    /// encoding resolves to [`MuteState::Unmuted`].
    pub fn state(self) -> MuteState {
        match self {
            Encoding::Muted => MuteState::Muted,
            Encoding::Unmuted | Encoding::Unrecognized => MuteState::Unmuted,
        }
    }

    pub fn is_recognized(self) -> bool {
        !matches!(self, Encoding::Unrecognized)
    }
}
