//! Manually advanced clock for deterministic tests and simulations.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::clock::{Clock, Tick, TimerHandle, MIN_PERIOD};

struct Interval {
    period: Duration,
    due: Duration,
    tick: Tick,
}

#[derive(Default)]
struct Timeline {
    now: Duration,
    next_id: u64,
    intervals: BTreeMap<TimerHandle, Interval>,
}

/// Clock whose time only moves when [`advance`](VirtualClock::advance) is
/// called.
///
/// Clones share the same timeline.
#[derive(Clone, Default)]
pub struct VirtualClock {
    timeline: Rc<RefCell<Timeline>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the clock was created.
    pub fn now(&self) -> Duration {
        self.timeline.borrow().now
    }

    /// Number of live intervals.
    pub fn pending(&self) -> usize {
        self.timeline.borrow().intervals.len()
    }

    /// Move time forward by `by`, running every tick that falls due.
    ///
    /// Ticks run in due order; ties run in scheduling order. A tick may
    /// schedule or clear intervals, and those changes apply to the rest
    /// of the advance.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(tick) = self.next_due(target) {
            tick();
        }
        self.timeline.borrow_mut().now = target;
    }

    /// Advance to an absolute instant. Instants in the past are ignored.
    pub fn advance_to(&self, instant: Duration) {
        let now = self.now();
        if instant > now {
            self.advance(instant - now);
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    fn next_due(&self, target: Duration) -> Option<Tick> {
        let mut timeline = self.timeline.borrow_mut();
        let (&handle, due) = timeline
            .intervals
            .iter()
            .filter(|(_, interval)| interval.due <= target)
            .min_by_key(|(handle, interval)| (interval.due, **handle))
            .map(|(handle, interval)| (handle, interval.due))?;

        timeline.now = due;
        let interval = timeline.intervals.get_mut(&handle)?;
        interval.due += interval.period;
        Some(interval.tick.clone())
    }
}

impl Clock for VirtualClock {
    fn set_interval(&self, period: Duration, tick: Tick) -> TimerHandle {
        let mut timeline = self.timeline.borrow_mut();
        let handle = TimerHandle::new(timeline.next_id);
        timeline.next_id += 1;
        let period = period.max(MIN_PERIOD);
        let due = timeline.now + period;
        timeline.intervals.insert(handle, Interval { period, due, tick });
        handle
    }

    fn clear_interval(&self, handle: TimerHandle) {
        self.timeline.borrow_mut().intervals.remove(&handle);
    }
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timeline = self.timeline.borrow();
        f.debug_struct("VirtualClock")
            .field("now", &timeline.now)
            .field("intervals", &timeline.intervals.len())
            .finish()
    }
}
