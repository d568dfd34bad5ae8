use std::time::Duration;

/// Step applied by the breach progress counter on each tick.
pub const BREACH_PROGRESS_STEP: u8 = 1;
/// Step applied by the extraction counter on each tick.
pub const EXTRACTION_STEP: u8 = 2;
/// Step applied by the loading counter on each tick.
pub const LOADING_STEP: u8 = 1;

/// Periods and delays for every screen timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenTimings {
    pub loading_tick: Duration,
    /// Pause between the loading counter reaching 100 and leaving the screen.
    pub loading_exit_delay: Duration,
    pub thank_you_dwell: Duration,
    pub breach_progress_tick: Duration,
    /// Reveal one character per tick; 1 ms is the finest the timer wheel offers.
    pub typewriter_tick: Duration,
    pub cursor_blink: Duration,
    pub extraction_tick: Duration,
}

impl Default for ScreenTimings {
    fn default() -> Self {
        Self {
            loading_tick: Duration::from_millis(25),
            loading_exit_delay: Duration::from_millis(500),
            thank_you_dwell: Duration::from_millis(2_000),
            breach_progress_tick: Duration::from_millis(40),
            typewriter_tick: Duration::from_millis(1),
            cursor_blink: Duration::from_millis(500),
            extraction_tick: Duration::from_millis(50),
        }
    }
}
