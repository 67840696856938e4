//! Mapping from mute state to what the indicator shows.

use crate::MuteState;

/// The two visual variants of the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visual {
    /// Default look, the microphone is live
    Neutral,
    /// Highlighted look, the microphone is muted
    Highlighted,
}

impl Visual {
    /// Tooltip text for this variant.
    pub fn label(self) -> &'static str {
        match self {
            Visual::Neutral => "Microphone live",
            Visual::Highlighted => "Microphone muted",
        }
    }
}

/// Tracks the currently displayed variant and reports transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresenter {
    current: Visual,
}

impl StatusPresenter {
    /// Create a presenter showing the variant for `initial`.
    pub fn new(initial: MuteState) -> Self {
        Self {
            current: Self::render(initial),
        }
    }

    /// Map a mute state to its visual variant.
    pub fn render(state: MuteState) -> Visual {
        match state {
            MuteState::Muted => Visual::Highlighted,
            MuteState::Unmuted => Visual::Neutral,
        }
    }

    /// Feed an observed state. Returns the new variant if the display has to
    /// change, `None` if it already shows the right one.
    pub fn observe(&mut self, state: MuteState) -> Option<Visual> {
        let next = Self::render(state);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }

    /// The variant currently displayed.
    pub fn current(&self) -> Visual {
        self.current
    }
}

impl Default for StatusPresenter {
    fn default() -> Self {
        Self::new(MuteState::default())
    }
}
