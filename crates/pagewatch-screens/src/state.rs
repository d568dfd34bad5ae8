use serde::Serialize;

use crate::timings::LOADING_STEP;

pub const COUNTER_MAX: u8 = 100;

const ADVISORIES: [(u8, &str); 3] = [
    (90, "Polishing the final comic panel..."),
    (60, "Unfolding the tension between characters..."),
    (30, "Turning the next dramatic page..."),
];
const INITIAL_ADVISORY: &str = "Initializing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Loading,
    ThankYou,
    Breach,
}

impl ScreenKind {
    /// The only screen this one may hand over to. `Breach` is terminal.
    #[must_use]
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Loading => Some(Self::ThankYou),
            Self::ThankYou => Some(Self::Breach),
            Self::Breach => None,
        }
    }
}

/// Counters owned by the breach screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreachState {
    pub typed_len: usize,
    pub cursor_visible: bool,
    pub progress: u8,
    pub extraction: u8,
}

impl BreachState {
    #[must_use]
    pub fn initial() -> Self {
        Self {
            typed_len: 0,
            cursor_visible: true,
            progress: 0,
            extraction: 0,
        }
    }
}

/// The active screen together with the data it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenState {
    Loading { progress: u8 },
    ThankYou,
    Breach(BreachState),
}

impl ScreenState {
    /// State as it is on entry to `kind`, with every counter at its start value.
    #[must_use]
    pub fn initial(kind: ScreenKind) -> Self {
        match kind {
            ScreenKind::Loading => Self::Loading { progress: 0 },
            ScreenKind::ThankYou => Self::ThankYou,
            ScreenKind::Breach => Self::Breach(BreachState::initial()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::Loading { .. } => ScreenKind::Loading,
            Self::ThankYou => ScreenKind::ThankYou,
            Self::Breach(_) => ScreenKind::Breach,
        }
    }
}

/// Adds `step` to a percentage counter, clamping at 100.
#[must_use]
pub fn advance_counter(value: u8, step: u8) -> u8 {
    value.saturating_add(step).min(COUNTER_MAX)
}

/// Loading-screen caption for a given progress value.
#[must_use]
pub fn advisory_for(progress: u8) -> &'static str {
    ADVISORIES
        .iter()
        .find(|(threshold, _)| progress >= *threshold)
        .map_or(INITIAL_ADVISORY, |(_, text)| *text)
}

pub(crate) fn next_loading_progress(progress: u8) -> u8 {
    advance_counter(progress, LOADING_STEP)
}
