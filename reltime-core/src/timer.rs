//! Repeating timers with scoped lifetimes.
//!
//! A [`Scheduler`] registers a repeating timer and hands back a
//! [`TimerHandle`]. The timer only posts ticks into the handle's queue; the
//! owner drains them on its own thread. Dropping the handle cancels the timer,
//! and once `drop` returns no further ticks are produced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

fn next_timer_id() -> u64 {
    NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Registers repeating timers.
pub trait Scheduler {
    /// Start a timer firing every `period` until the handle is dropped.
    fn every(&self, period: Duration) -> Result<TimerHandle>;
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    fn every(&self, period: Duration) -> Result<TimerHandle> {
        (**self).every(period)
    }
}

type Cancel = Box<dyn FnOnce() + Send>;

/// Ownership of one registered timer.
pub struct TimerHandle {
    id: u64,
    period: Duration,
    ticks: Receiver<()>,
    cancel: Option<Cancel>,
}

impl TimerHandle {
    fn new(id: u64, period: Duration, ticks: Receiver<()>, cancel: Cancel) -> Self {
        tracing::debug!(timer_id = id, period_ms = period.as_millis() as u64, "Timer started");
        Self {
            id,
            period,
            ticks,
            cancel: Some(cancel),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Consume every tick posted so far without blocking.
    pub fn take_ticks(&self) -> usize {
        self.ticks.try_iter().count()
    }

    /// Block for up to `timeout` waiting for the next tick.
    pub fn wait_tick(&self, timeout: Duration) -> bool {
        self.ticks.recv_timeout(timeout).is_ok()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
            tracing::debug!(timer_id = self.id, "Timer cancelled");
        }
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

fn check_period(period: Duration) -> Result<()> {
    if period.is_zero() {
        return Err(Error::Timer("timer period must be non-zero".to_string()));
    }
    Ok(())
}

/// Runs each timer on its own helper thread.
///
/// Firings are scheduled against fixed deadlines (`start + n * period`), so a
/// slow consumer does not make the timer drift.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn every(&self, period: Duration) -> Result<TimerHandle> {
        check_period(period)?;

        let id = next_timer_id();
        let (tick_tx, tick_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker = thread::Builder::new()
            .name(format!("reltime-timer-{id}"))
            .spawn(move || run_timer(period, &stop_rx, &tick_tx))?;

        let cancel: Cancel = Box::new(move || {
            drop(stop_tx);
            if worker.join().is_err() {
                tracing::warn!(timer_id = id, "Timer thread panicked");
            }
        });

        Ok(TimerHandle::new(id, period, tick_rx, cancel))
    }
}

fn run_timer(period: Duration, stop: &Receiver<()>, ticks: &Sender<()>) {
    let mut deadline = Instant::now() + period;
    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        match stop.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {
                if ticks.send(()).is_err() {
                    break;
                }
                deadline += period;
            }
            // Stop requested or the handle is gone
            _ => break,
        }
    }
}

/// A scheduler driven by hand, for tests.
///
/// Timers fire only from [`ManualScheduler::advance`]. The scheduler counts
/// live timers and every tick it has delivered.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Debug, Default)]
struct ManualState {
    timers: Vec<ManualTimer>,
    fired: u64,
}

#[derive(Debug)]
struct ManualTimer {
    id: u64,
    period: Duration,
    elapsed: Duration,
    ticks: Sender<()>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward, firing every timer whose period elapses.
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        let mut fired = 0;
        for timer in &mut state.timers {
            timer.elapsed += by;
            while timer.elapsed >= timer.period {
                timer.elapsed -= timer.period;
                if timer.ticks.send(()).is_ok() {
                    fired += 1;
                }
            }
        }
        state.fired += fired;
    }

    /// Number of timers registered and not yet cancelled.
    pub fn active_timers(&self) -> usize {
        self.lock().timers.len()
    }

    /// Total ticks delivered across all timers.
    pub fn total_fired(&self) -> u64 {
        self.lock().fired
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period: Duration) -> Result<TimerHandle> {
        check_period(period)?;

        let id = next_timer_id();
        let (tick_tx, tick_rx) = mpsc::channel();
        self.lock().timers.push(ManualTimer {
            id,
            period,
            elapsed: Duration::ZERO,
            ticks: tick_tx,
        });

        let state = Arc::clone(&self.state);
        let cancel: Cancel = Box::new(move || {
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            state.timers.retain(|t| t.id != id);
        });

        Ok(TimerHandle::new(id, period, tick_rx, cancel))
    }
}
