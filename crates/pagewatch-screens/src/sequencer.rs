//! The screen state machine.

use tokio::sync::{mpsc, watch};

use crate::script::{BreachScript, Identity};
use crate::state::{
    advance_counter, advisory_for, next_loading_progress, ScreenKind, ScreenState, COUNTER_MAX,
};
use crate::timers::{Timer, TimerFired, TimerSet};
use crate::timings::{ScreenTimings, BREACH_PROGRESS_STEP, EXTRACTION_STEP};

/// Immutable snapshot handed to the renderer after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub state: ScreenState,
    pub advisory: &'static str,
    pub identity: Identity,
    /// Present once the breach screen has been entered.
    pub script: Option<BreachScript>,
}

impl ScreenView {
    /// The part of the breach script revealed so far.
    #[must_use]
    pub fn typed_text(&self) -> &str {
        match (&self.state, &self.script) {
            (ScreenState::Breach(breach), Some(script)) => script.prefix(breach.typed_len),
            _ => "",
        }
    }
}

#[derive(Debug)]
enum ScreenInput {
    Identity(Identity),
}

/// Caller-side handle: feeds the resolved identity in and reads views out.
#[derive(Clone)]
pub struct ScreenHandle {
    input_tx: mpsc::UnboundedSender<ScreenInput>,
    view_rx: watch::Receiver<ScreenView>,
}

impl ScreenHandle {
    /// Updates the identity shown on screen. Returns `false` once the
    /// sequencer is gone.
    pub fn set_identity(&self, identity: Identity) -> bool {
        self.input_tx.send(ScreenInput::Identity(identity)).is_ok()
    }

    #[must_use]
    pub fn view(&self) -> ScreenView {
        self.view_rx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScreenView> {
        self.view_rx.clone()
    }
}

/// Drives `Loading → ThankYou → Breach`.
///
/// Exactly one state is active. Entering a state resets its counters and
/// starts its timers; leaving it cancels all of them before the next state
/// is entered. Intended to run on a single-threaded runtime: timers only
/// post messages and every mutation happens in [`ScreenSequencer::next_event`].
pub struct ScreenSequencer {
    state: ScreenState,
    advisory: &'static str,
    identity: Identity,
    script: Option<BreachScript>,
    timings: ScreenTimings,
    timers: TimerSet,
    fired_rx: mpsc::UnboundedReceiver<TimerFired>,
    input_rx: mpsc::UnboundedReceiver<ScreenInput>,
    inputs_open: bool,
    view_tx: watch::Sender<ScreenView>,
    started: bool,
}

impl ScreenSequencer {
    #[must_use]
    pub fn new(timings: ScreenTimings) -> (Self, ScreenHandle) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let state = ScreenState::initial(ScreenKind::Loading);
        let identity = Identity::default();
        let (view_tx, view_rx) = watch::channel(ScreenView {
            state,
            advisory: advisory_for(0),
            identity: identity.clone(),
            script: None,
        });

        let sequencer = Self {
            state,
            advisory: advisory_for(0),
            identity,
            script: None,
            timings,
            timers: TimerSet::new(fired_tx),
            fired_rx,
            input_rx,
            inputs_open: true,
            view_tx,
            started: false,
        };
        let handle = ScreenHandle { input_tx, view_rx };
        (sequencer, handle)
    }

    #[must_use]
    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    #[must_use]
    pub fn view(&self) -> ScreenView {
        ScreenView {
            state: self.state,
            advisory: self.advisory,
            identity: self.identity.clone(),
            script: self.script.clone(),
        }
    }

    /// Timers currently running for the active state.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.timers.active()
    }

    /// Enters the initial `Loading` state. Calling it again is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.enter(ScreenKind::Loading);
    }

    /// Runs the sequence until the future is dropped. `Breach` is terminal,
    /// so in practice this only ends with the surrounding application.
    pub async fn run(mut self) {
        self.start();
        while self.next_event().await {}
    }

    /// Waits for one timer or input message and applies it. Returns `false`
    /// only when no further events can arrive.
    pub async fn next_event(&mut self) -> bool {
        tokio::select! {
            fired = self.fired_rx.recv() => match fired {
                Some(fired) => {
                    self.on_timer(fired);
                    true
                }
                None => false,
            },
            input = self.input_rx.recv(), if self.inputs_open => {
                match input {
                    Some(ScreenInput::Identity(identity)) => self.on_identity(identity),
                    None => self.inputs_open = false,
                }
                true
            }
        }
    }

    fn on_identity(&mut self, identity: Identity) {
        tracing::debug!(ip = %identity.ip, "screen identity updated");
        // The breach script stays as it was frozen on entry; only the info
        // rows pick up the new values.
        self.identity = identity;
        self.publish();
    }

    fn on_timer(&mut self, fired: TimerFired) {
        if !self.timers.is_live(&fired) {
            tracing::trace!(
                timer = ?fired.timer,
                generation = fired.generation,
                "discarding stale timer message"
            );
            return;
        }

        match fired.timer {
            Timer::LoadingTick => self.tick_loading(),
            Timer::LoadingExit => self.transition(ScreenKind::ThankYou),
            Timer::ThankYouDwell => self.transition(ScreenKind::Breach),
            Timer::BreachProgress | Timer::Typewriter | Timer::CursorBlink | Timer::Extraction => {
                self.tick_breach(fired.timer);
            }
        }
    }

    fn tick_loading(&mut self) {
        let ScreenState::Loading { progress } = &mut self.state else {
            return;
        };
        *progress = next_loading_progress(*progress);
        self.advisory = advisory_for(*progress);

        if *progress >= COUNTER_MAX {
            self.timers.stop(Timer::LoadingTick);
            self.timers
                .once(Timer::LoadingExit, self.timings.loading_exit_delay);
        }
        self.publish();
    }

    fn tick_breach(&mut self, timer: Timer) {
        let ScreenState::Breach(breach) = &mut self.state else {
            return;
        };
        let finished = match timer {
            Timer::BreachProgress => {
                breach.progress = advance_counter(breach.progress, BREACH_PROGRESS_STEP);
                breach.progress >= COUNTER_MAX
            }
            Timer::Extraction => {
                breach.extraction = advance_counter(breach.extraction, EXTRACTION_STEP);
                breach.extraction >= COUNTER_MAX
            }
            Timer::Typewriter => {
                let total = self.script.as_ref().map_or(0, BreachScript::char_len);
                if breach.typed_len < total {
                    breach.typed_len += 1;
                }
                breach.typed_len >= total
            }
            Timer::CursorBlink => {
                breach.cursor_visible = !breach.cursor_visible;
                false
            }
            Timer::LoadingTick | Timer::LoadingExit | Timer::ThankYouDwell => false,
        };
        if finished {
            self.timers.stop(timer);
        }
        self.publish();
    }

    fn transition(&mut self, to: ScreenKind) {
        let from = self.state.kind();
        if from.successor() != Some(to) {
            tracing::warn!(?from, ?to, "ignoring invalid screen transition");
            return;
        }
        self.timers.cancel_all();
        tracing::info!(?from, ?to, "screen transition");
        self.enter(to);
    }

    fn enter(&mut self, kind: ScreenKind) {
        self.state = ScreenState::initial(kind);
        let timings = self.timings;
        match kind {
            ScreenKind::Loading => {
                self.advisory = advisory_for(0);
                self.timers.every(Timer::LoadingTick, timings.loading_tick);
            }
            ScreenKind::ThankYou => {
                self.timers.once(Timer::ThankYouDwell, timings.thank_you_dwell);
            }
            ScreenKind::Breach => {
                self.script = Some(BreachScript::new(&self.identity));
                self.timers
                    .every(Timer::BreachProgress, timings.breach_progress_tick);
                self.timers.every(Timer::Typewriter, timings.typewriter_tick);
                self.timers.every(Timer::CursorBlink, timings.cursor_blink);
                self.timers.every(Timer::Extraction, timings.extraction_tick);
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn nothing_runs_before_start() {
        let (sequencer, handle) = ScreenSequencer::new(ScreenTimings::default());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(sequencer.active_timers(), 0);
        assert_eq!(handle.view().state, ScreenState::Loading { progress: 0 });
        assert_eq!(handle.view().advisory, "Initializing...");
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let (mut sequencer, _handle) = ScreenSequencer::new(ScreenTimings::default());
        sequencer.start();
        sequencer.start();
        assert_eq!(sequencer.active_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_counter_stops_at_one_hundred_before_exit_delay() {
        let (mut sequencer, _handle) = ScreenSequencer::new(ScreenTimings::default());
        sequencer.start();
        while *sequencer.state() != (ScreenState::Loading { progress: 100 }) {
            assert!(sequencer.next_event().await);
        }
        // Only the one-shot exit delay remains.
        assert_eq!(sequencer.active_timers(), 1);
        assert_eq!(sequencer.view().advisory, "Polishing the final comic panel...");

        assert!(sequencer.next_event().await);
        assert_eq!(sequencer.state().kind(), ScreenKind::ThankYou);
    }

    #[tokio::test(start_paused = true)]
    async fn thank_you_owns_a_single_dwell_timer() {
        let (mut sequencer, _handle) = ScreenSequencer::new(ScreenTimings::default());
        sequencer.start();
        while sequencer.state().kind() == ScreenKind::Loading {
            assert!(sequencer.next_event().await);
        }
        assert_eq!(sequencer.state(), &ScreenState::ThankYou);
        assert_eq!(sequencer.active_timers(), 1);

        assert!(sequencer.next_event().await);
        let ScreenState::Breach(breach) = *sequencer.state() else {
            panic!("expected breach, got {:?}", sequencer.state());
        };
        assert_eq!(breach.typed_len, 0);
        assert_eq!(sequencer.active_timers(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_transition_is_ignored() {
        let (mut sequencer, _handle) = ScreenSequencer::new(ScreenTimings::default());
        sequencer.start();
        sequencer.transition(ScreenKind::Breach);
        assert_eq!(sequencer.state().kind(), ScreenKind::Loading);
        assert_eq!(sequencer.active_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn identity_updates_after_breach_entry_keep_the_script() {
        let (mut sequencer, handle) = ScreenSequencer::new(ScreenTimings::default());
        sequencer.start();
        assert!(handle.set_identity(Identity {
            ip: "203.0.113.7".to_string(),
            country: "Portugal".to_string(),
        }));
        while sequencer.state().kind() != ScreenKind::Breach {
            assert!(sequencer.next_event().await);
        }
        let frozen = sequencer.view().script.expect("script on breach entry");
        assert!(frozen.text().contains("203.0.113.7"));

        assert!(handle.set_identity(Identity {
            ip: "198.51.100.1".to_string(),
            country: "Chile".to_string(),
        }));
        while sequencer.view().identity.ip != "198.51.100.1" {
            assert!(sequencer.next_event().await);
        }
        assert_eq!(sequencer.view().script, Some(frozen));
    }

    #[tokio::test(start_paused = true)]
    async fn messages_from_an_exited_screen_are_discarded() {
        let (mut sequencer, _handle) = ScreenSequencer::new(ScreenTimings::default());
        sequencer.start();
        let loading_generation = sequencer.timers.generation();
        let stale_tick = TimerFired {
            generation: loading_generation,
            timer: Timer::LoadingTick,
        };
        let stale_dwell = TimerFired {
            generation: loading_generation,
            timer: Timer::ThankYouDwell,
        };

        while sequencer.state().kind() == ScreenKind::Loading {
            assert!(sequencer.next_event().await);
        }
        assert_eq!(sequencer.state(), &ScreenState::ThankYou);
        assert_ne!(sequencer.timers.generation(), loading_generation);

        sequencer.on_timer(stale_tick);
        assert_eq!(sequencer.state(), &ScreenState::ThankYou);

        // The dwell timer is live in this screen, but not from that generation.
        sequencer.on_timer(stale_dwell);
        assert_eq!(sequencer.state(), &ScreenState::ThankYou);
        assert_eq!(sequencer.active_timers(), 1);
    }
}
