//! Recurring timer facilities.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Shortest interval a clock will schedule; shorter periods are raised to it.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Callback run on every elapsed interval.
pub type Tick = Rc<dyn Fn()>;

/// Opaque handle to a scheduled interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Schedules recurring callbacks.
pub trait Clock {
    /// Run `tick` every `period`, starting one period from now.
    ///
    /// Periods below [`MIN_PERIOD`] are clamped to it.
    fn set_interval(&self, period: Duration, tick: Tick) -> TimerHandle;

    /// Cancel an interval. Unknown or already-cleared handles are ignored.
    fn clear_interval(&self, handle: TimerHandle);
}

/// Clock backed by the tokio timer.
///
/// Intervals run as local tasks, so every `set_interval` call must happen
/// inside a [`tokio::task::LocalSet`].
#[derive(Debug, Default)]
pub struct TokioClock {
    next_id: Cell<u64>,
    tasks: RefCell<HashMap<TimerHandle, AbortHandle>>,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for TokioClock {
    fn set_interval(&self, period: Duration, tick: Tick) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        let period = period.max(MIN_PERIOD);
        let first = Instant::now() + period;

        let task = tokio::task::spawn_local(async move {
            let mut interval = time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick();
            }
        });

        trace!(?handle, ?period, "Interval scheduled");
        self.tasks.borrow_mut().insert(handle, task.abort_handle());
        handle
    }

    fn clear_interval(&self, handle: TimerHandle) {
        if let Some(task) = self.tasks.borrow_mut().remove(&handle) {
            task.abort();
            trace!(?handle, "Interval cleared");
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        for (_, task) in self.tasks.get_mut().drain() {
            task.abort();
        }
    }
}
