//! Single recurring timer owned by a detector.

use std::rc::Rc;
use std::time::Duration;

use crate::host::{Clock, Tick, TimerHandle};

/// Holds at most one live interval on the host clock.
pub(crate) struct Ticker {
    clock: Rc<dyn Clock>,
    tick: Tick,
    handle: Option<TimerHandle>,
}

impl Ticker {
    pub(crate) fn new(clock: Rc<dyn Clock>, tick: Tick) -> Self {
        Self {
            clock,
            tick,
            handle: None,
        }
    }

    /// Start a fresh interval, replacing any live one.
    pub(crate) fn arm(&mut self, period: Duration) {
        self.disarm();
        self.handle = Some(self.clock.set_interval(period, self.tick.clone()));
    }

    pub(crate) fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.clock.clear_interval(handle);
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.disarm();
    }
}
