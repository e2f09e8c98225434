//! idlewatch - idle and activity detection.
//!
//! Two detectors share one engine. An [`IdleDetector`] fires once no watched
//! interaction has happened for a whole timeout; an [`ActiveDetector`] fires
//! when interactions happen, either at the next period boundary or at once.
//!
//! Detectors run single-threaded against a [`Host`]: a [`Clock`] for the
//! recurring timer and a document-level [`EventSource`] for the default
//! interaction surface.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use idlewatch::{EventTarget, Host, IdleDetector, VirtualClock};
//!
//! let clock = VirtualClock::new();
//! let document = Rc::new(EventTarget::new("document"));
//! let host = Host::new(Rc::new(clock.clone()), document.clone());
//!
//! let fired = Rc::new(Cell::new(false));
//! let flag = fired.clone();
//! let idle = IdleDetector::new(&host);
//! idle.add_default_interaction_surface()
//!     .configure_timeout(1, 1000)
//!     .on_fire(move || flag.set(true))
//!     .start()
//!     .unwrap();
//!
//! clock.advance_ms(500);
//! document.dispatch("keydown");
//! clock.advance_ms(900);
//! assert!(!fired.get());
//! clock.advance_ms(200);
//! assert!(fired.get());
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod host;

pub use config::Config;
pub use detector::{
    Active, ActiveDetector, ActivityState, Callback, Detector, Idle, IdleDetector, Interaction,
    Lifecycle, Policy, Reaction, TimerAction, Timeout,
};
pub use error::{Error, Result};
pub use host::{
    Clock, EventSource, EventTarget, Host, Listener, TimerHandle, TokioClock, VirtualClock,
};
