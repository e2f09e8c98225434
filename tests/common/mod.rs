#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use idlewatch::host::Tick;
use idlewatch::{Clock, EventTarget, Host, VirtualClock};

/// Virtual host with a shared firing counter.
pub struct Harness {
    pub clock: VirtualClock,
    pub document: Rc<EventTarget>,
    pub host: Host,
    pub fired: Rc<Cell<u32>>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = VirtualClock::new();
        let document = Rc::new(EventTarget::new("document"));
        let host = Host::new(Rc::new(clock.clone()), document.clone());
        Self {
            clock,
            document,
            host,
            fired: Rc::new(Cell::new(0)),
        }
    }

    /// Callback that bumps `fired`.
    pub fn counter(&self) -> impl Fn() + 'static {
        let fired = self.fired.clone();
        move || fired.set(fired.get() + 1)
    }

    pub fn fired(&self) -> u32 {
        self.fired.get()
    }

    /// Advance the clock to `ms` milliseconds after creation.
    pub fn at(&self, ms: u64) {
        self.clock.advance_to(std::time::Duration::from_millis(ms));
    }

    pub fn click(&self) {
        self.document.dispatch("click");
    }

    /// Run `action` once at `ms`. Ties run in scheduling order, so calling
    /// this before a detector starts puts `action` ahead of the detector's
    /// tick at the same instant.
    pub fn schedule(&self, ms: u64, action: impl Fn() + 'static) {
        let handle = Rc::new(Cell::new(None));
        let tick: Tick = {
            let clock = self.clock.clone();
            let handle = handle.clone();
            Rc::new(move || {
                if let Some(h) = handle.get() {
                    clock.clear_interval(h);
                }
                action();
            })
        };
        handle.set(Some(self.clock.set_interval(Duration::from_millis(ms), tick)));
    }

    /// Click at `ms`, ahead of any tick scheduled later for the same instant.
    pub fn schedule_click(&self, ms: u64) {
        let document = self.document.clone();
        self.schedule(ms, move || document.dispatch("click"));
    }
}
