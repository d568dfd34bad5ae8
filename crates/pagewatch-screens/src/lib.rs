//! Staged full-screen sequence: loading, thank-you, breach dashboard.
//!
//! [`ScreenSequencer`] owns the active [`ScreenState`] and a [`TimerSet`]
//! holding every timer started for that state. Timers only post messages;
//! the sequencer applies them, so state is never touched from two places.

pub mod script;
pub mod sequencer;
pub mod state;
pub mod timers;
pub mod timings;

pub use script::{BreachScript, Identity};
pub use sequencer::{ScreenHandle, ScreenSequencer, ScreenView};
pub use state::{advance_counter, advisory_for, BreachState, ScreenKind, ScreenState};
pub use timers::{Timer, TimerFired, TimerSet};
pub use timings::ScreenTimings;
