//! Host facilities a detector runs against: a timer and an event surface.

mod clock;
mod target;
mod virtual_clock;

use std::rc::Rc;

pub use clock::{Clock, Tick, TimerHandle, TokioClock, MIN_PERIOD};
pub use target::{EventSource, EventTarget, Listener};
pub use virtual_clock::VirtualClock;

/// Events watched on the document target by the default interaction surface.
pub const DEFAULT_DOCUMENT_EVENTS: [&str; 6] = [
    "click",
    "mousemove",
    "mouseenter",
    "keydown",
    "scroll",
    "touchstart",
];

/// The clock and document-level target shared by detectors.
#[derive(Clone)]
pub struct Host {
    clock: Rc<dyn Clock>,
    document: Rc<dyn EventSource>,
}

impl Host {
    pub fn new(clock: Rc<dyn Clock>, document: Rc<dyn EventSource>) -> Self {
        Self { clock, document }
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    /// Target the default interaction surface binds to.
    pub fn document(&self) -> &Rc<dyn EventSource> {
        &self.document
    }
}
