//! Cancellable timers bound to one screen.
//!
//! Every timer is a task that posts [`TimerFired`] messages tagged with the
//! generation it was started under. [`TimerSet::cancel_all`] aborts the
//! tasks and bumps the generation, so a message already sitting in the queue
//! from a previous screen is recognised as stale by [`TimerSet::is_live`].

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    LoadingTick,
    LoadingExit,
    ThankYouDwell,
    BreachProgress,
    Typewriter,
    CursorBlink,
    Extraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub generation: u64,
    pub timer: Timer,
}

/// Timers started for the current screen.
///
/// Dropping the set aborts every task it still holds.
pub struct TimerSet {
    generation: u64,
    tx: UnboundedSender<TimerFired>,
    handles: HashMap<Timer, JoinHandle<()>>,
}

impl TimerSet {
    #[must_use]
    pub fn new(tx: UnboundedSender<TimerFired>) -> Self {
        Self {
            generation: 0,
            tx,
            handles: HashMap::new(),
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of timers started in this generation and not yet stopped.
    #[must_use]
    pub fn active(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn contains(&self, timer: Timer) -> bool {
        self.handles.contains_key(&timer)
    }

    /// Fires `timer` every `period`, first after one full period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn every(&mut self, timer: Timer, period: Duration) {
        let period = period.max(MIN_PERIOD);
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let fired = self.fired(timer);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            loop {
                ticks.tick().await;
                if tx.send(fired).is_err() {
                    break;
                }
            }
        });
        self.insert(timer, handle);
    }

    /// Fires `timer` once after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn once(&mut self, timer: Timer, delay: Duration) {
        let fired = self.fired(timer);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(fired);
        });
        self.insert(timer, handle);
    }

    /// Aborts a single timer; its queued messages become stale.
    pub fn stop(&mut self, timer: Timer) {
        if let Some(handle) = self.handles.remove(&timer) {
            handle.abort();
        }
    }

    /// Aborts every timer and starts a new generation.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Whether `fired` came from a timer that is still running in the
    /// current generation.
    #[must_use]
    pub fn is_live(&self, fired: &TimerFired) -> bool {
        fired.generation == self.generation && self.handles.contains_key(&fired.timer)
    }

    fn fired(&self, timer: Timer) -> TimerFired {
        TimerFired {
            generation: self.generation,
            timer,
        }
    }

    fn insert(&mut self, timer: Timer, handle: JoinHandle<()>) {
        if let Some(previous) = self.handles.insert(timer, handle) {
            previous.abort();
        }
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        for handle in self.handles.values() {
            handle.abort();
        }
    }
}
