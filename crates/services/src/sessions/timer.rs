use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::TimerError;

/// Repeating countdown driver owned by a quiz session.
///
/// `start` must cancel any prior run first, so a session never has two live
/// timers. Each tick is tagged with the epoch passed to `start`.
pub trait Ticker: Send {
    fn start(&mut self, epoch: u64);
    fn cancel(&mut self);
    fn is_running(&self) -> bool;
}

/// Tokio-backed ticker that sends the epoch on a channel once per period.
pub struct TokioTicker {
    period: Duration,
    runtime: Handle,
    ticks: mpsc::UnboundedSender<u64>,
    task: Option<JoinHandle<()>>,
}

impl TokioTicker {
    /// Create a ticker bound to the current Tokio runtime, plus the receiver
    /// its ticks arrive on.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::NoRuntime` when called outside a Tokio runtime.
    pub fn new(period: Duration) -> Result<(Self, mpsc::UnboundedReceiver<u64>), TimerError> {
        let runtime = Handle::try_current()?;
        let (ticks, rx) = mpsc::unbounded_channel();
        Ok((
            Self {
                period,
                runtime,
                ticks,
                task: None,
            },
            rx,
        ))
    }
}

impl Ticker for TokioTicker {
    fn start(&mut self, epoch: u64) {
        self.cancel();

        let period = self.period;
        let ticks = self.ticks.clone();
        self.task = Some(self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(epoch).is_err() {
                    break;
                }
            }
        }));
        debug!(epoch, period_ms = period.as_millis(), "Countdown started");
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Countdown cancelled");
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Default)]
struct ManualTickerState {
    running: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    epoch: AtomicU64,
}

/// Ticker that never fires on its own; it records start/stop calls so tests
/// can drive ticks by hand and check the cancel discipline.
///
/// Clones share state, so a test can keep one handle after boxing another
/// into a session.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    state: Arc<ManualTickerState>,
}

impl ManualTicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `start` calls.
    #[must_use]
    pub fn starts(&self) -> usize {
        self.state.starts.load(Ordering::SeqCst)
    }

    /// Number of times a running countdown was actually stopped.
    #[must_use]
    pub fn stops(&self) -> usize {
        self.state.stops.load(Ordering::SeqCst)
    }

    /// Epoch passed to the most recent `start`.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.state.epoch.load(Ordering::SeqCst)
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, epoch: u64) {
        self.cancel();
        self.state.epoch.store(epoch, Ordering::SeqCst);
        self.state.starts.fetch_add(1, Ordering::SeqCst);
        self.state.running.store(true, Ordering::SeqCst);
    }

    fn cancel(&mut self) {
        if self.state.running.swap(false, Ordering::SeqCst) {
            self.state.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }
}
