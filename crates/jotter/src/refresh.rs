//! Timed re-rendering of a note list.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::controller::NoteListController;
use crate::error::{Error, Result};

/// Keeps an auto-refresh timer alive.
///
/// The timer stops when [`cancel`](Self::cancel) is called or the handle is
/// dropped, whichever comes first.
#[derive(Debug)]
pub struct RefreshHandle {
    period: Duration,
    stop_signal: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the timer. No render starts after this returns.
    pub fn cancel(&self) {
        if !self.stop_signal.swap(true, Ordering::SeqCst) {
            debug!("Cancelling note list refresh");
        }
        self.task.abort();
    }

    /// Check if the timer is still armed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.stop_signal.load(Ordering::SeqCst) && !self.task.is_finished()
    }

    /// Number of timer-driven renders so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// The timer period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Render `controller` every `period`, starting one period from now.
///
/// Render failures are logged and the timer keeps going.
pub(crate) fn spawn(controller: NoteListController, period: Duration) -> Result<RefreshHandle> {
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;

    let stop_signal = Arc::new(AtomicBool::new(false));
    let ticks = Arc::new(AtomicU64::new(0));

    let task = {
        let stop_signal = Arc::clone(&stop_signal);
        let ticks = Arc::clone(&ticks);
        runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if stop_signal.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(e) = controller.render() {
                    warn!("Scheduled note list render failed: {}", e);
                }
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    debug!("Armed note list refresh every {:?}", period);
    Ok(RefreshHandle {
        period,
        stop_signal,
        ticks,
        task,
    })
}
