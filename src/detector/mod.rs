//! Detector engine shared by the idle and active policies.
//!
//! A [`Detector`] owns the interaction registry, a single recurring timer and
//! the user callback. Interactions and elapsed intervals are routed to the
//! detector's [`Policy`], which decides whether to fire and what happens to
//! the timer. The policy never sees the host; the engine applies its
//! [`Reaction`].

mod active;
mod idle;
mod registry;
mod ticker;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::host::{EventSource, Host, Listener, Tick};

pub use active::Active;
pub use idle::Idle;
pub use registry::Interaction;

use registry::InteractionRegistry;
use ticker::Ticker;

/// Default length of one timeout unit: a minute.
pub const DEFAULT_UNIT_MS: u64 = 60_000;

/// User callback run when the policy fires.
pub type Callback = Rc<dyn Fn()>;

/// Detector that fires after a quiet timeout.
pub type IdleDetector = Detector<Idle>;

/// Detector that fires on interaction.
pub type ActiveDetector = Detector<Active>;

/// Transition reported to subscribers whenever a detector fires.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityState {
    /// The surface was interacted with.
    Active,
    /// The surface has been idle since the given time.
    Idle { since: DateTime<Utc> },
}

/// Timeout length as a count of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    /// Number of units in one timeout.
    pub period_count: u32,
    /// Length of one unit in milliseconds.
    pub unit_ms: u64,
}

impl Timeout {
    pub fn new(period_count: u32, unit_ms: u64) -> Self {
        Self {
            period_count,
            unit_ms,
        }
    }

    pub fn minutes(period_count: u32) -> Self {
        Self::new(period_count, DEFAULT_UNIT_MS)
    }

    /// Length of one timer interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.period_count).saturating_mul(self.unit_ms))
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::minutes(1)
    }
}

/// What the engine does with its timer after a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Keep,
    /// Cancel the live interval and start a fresh one.
    Rearm,
    Disarm,
}

/// Outcome of a policy hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction {
    /// Run the callback and notify subscribers.
    pub fire: bool,
    /// What to do with the live interval.
    pub timer: TimerAction,
}

/// Decides what interactions and elapsed intervals mean.
pub trait Policy: 'static {
    fn on_interaction(&mut self) -> Reaction;

    fn on_tick(&mut self) -> Reaction;

    /// Transition broadcast when this policy fires.
    fn signal(last_interaction: DateTime<Utc>) -> ActivityState;
}

/// Lifecycle of a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unstarted,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    Interaction,
    Tick,
}

/// Shared state behind a detector and its listener and tick closures.
struct Core<P> {
    /// Firing policy and its counters.
    policy: P,
    /// Watched (target, events) bindings.
    registry: InteractionRegistry,
    /// The single recurring timer.
    ticker: Ticker,
    /// Listener attached to every watched event; removal needs this exact `Rc`.
    listener: Listener,
    /// Target used by the default interaction surface.
    document: Rc<dyn EventSource>,
    /// Timeout applied on the next arm.
    timeout: Timeout,
    /// User callback, if set.
    callback: Option<Callback>,
    /// Current lifecycle state.
    lifecycle: Lifecycle,
    /// Last interaction, or the start of the current run if none since.
    last_interaction: DateTime<Utc>,
    /// Broadcast sender for fired transitions.
    transitions: broadcast::Sender<ActivityState>,
}

impl<P: Policy> Core<P> {
    fn dispatch(core: &Weak<RefCell<Self>>, hook: Hook) {
        let Some(core) = core.upgrade() else {
            return;
        };

        let callback = {
            let mut core = core.borrow_mut();
            if core.lifecycle != Lifecycle::Running {
                return;
            }

            let reaction = match hook {
                Hook::Interaction => {
                    trace!("Interaction observed");
                    core.last_interaction = Utc::now();
                    core.policy.on_interaction()
                }
                Hook::Tick => core.policy.on_tick(),
            };

            match reaction.timer {
                TimerAction::Keep => {}
                TimerAction::Rearm => {
                    let period = core.timeout.interval();
                    core.ticker.arm(period);
                }
                TimerAction::Disarm => core.ticker.disarm(),
            }

            if !reaction.fire {
                return;
            }

            let state = P::signal(core.last_interaction);
            debug!(?state, ?hook, "Detector fired");
            let _ = core.transitions.send(state);
            core.callback.clone()
        };

        if let Some(callback) = callback {
            callback();
        }
    }
}

impl<P> Drop for Core<P> {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            self.registry.detach(&self.listener);
        }
    }
}

/// Detector engine parameterised over its firing policy.
///
/// Configuration methods take `&self` and return `&Self` so calls chain.
/// Clones share one detector; dropping the last clone stops it.
pub struct Detector<P: Policy> {
    core: Rc<RefCell<Core<P>>>,
}

impl<P: Policy + Default> Detector<P> {
    pub fn new(host: &Host) -> Self {
        Self::with_policy(host, P::default())
    }
}

impl<P: Policy> Detector<P> {
    pub fn with_policy(host: &Host, policy: P) -> Self {
        let (transitions, _) = broadcast::channel(16);
        let core = Rc::new_cyclic(|weak: &Weak<RefCell<Core<P>>>| {
            let listener: Listener = {
                let weak = weak.clone();
                Rc::new(move || Core::dispatch(&weak, Hook::Interaction))
            };
            let tick: Tick = {
                let weak = weak.clone();
                Rc::new(move || Core::dispatch(&weak, Hook::Tick))
            };

            RefCell::new(Core {
                policy,
                registry: InteractionRegistry::default(),
                ticker: Ticker::new(host.clock().clone(), tick),
                listener,
                document: host.document().clone(),
                timeout: Timeout::default(),
                callback: None,
                lifecycle: Lifecycle::Unstarted,
                last_interaction: Utc::now(),
                transitions,
            })
        });

        Self { core }
    }

    /// Set the timeout to `period_count` units of `unit_ms` milliseconds.
    pub fn configure_timeout(&self, period_count: u32, unit_ms: u64) -> &Self {
        self.core.borrow_mut().timeout = Timeout::new(period_count, unit_ms);
        self
    }

    /// Set the timeout in minutes.
    pub fn configure_timeout_minutes(&self, period_count: u32) -> &Self {
        self.configure_timeout(period_count, DEFAULT_UNIT_MS)
    }

    /// Set the callback, replacing any previous one.
    pub fn on_fire(&self, callback: impl Fn() + 'static) -> &Self {
        self.core.borrow_mut().callback = Some(Rc::new(callback));
        self
    }

    /// Watch the default input events on the host's document target.
    pub fn add_default_interaction_surface(&self) -> &Self {
        let mut core = self.core.borrow_mut();
        let surface = Interaction::default_surface(core.document.clone());
        core.registry.push(surface);
        drop(core);
        self
    }

    pub fn add_interaction_source(&self, interaction: Interaction) -> &Self {
        self.core.borrow_mut().registry.push(interaction);
        self
    }

    pub fn add_interaction_sources(
        &self,
        interactions: impl IntoIterator<Item = Interaction>,
    ) -> &Self {
        self.core.borrow_mut().registry.extend(interactions);
        self
    }

    /// Attach listeners and arm the timer.
    ///
    /// Fails without touching any state when no interaction source has
    /// been registered.
    pub fn start(&self) -> Result<&Self> {
        let mut core = self.core.borrow_mut();
        if core.registry.is_empty() {
            return Err(Error::NoInteractions);
        }
        if core.lifecycle == Lifecycle::Running {
            warn!("Detector already running, re-attaching listeners and re-arming timer");
        }

        core.registry.attach(&core.listener);
        let timeout = core.timeout;
        core.ticker.arm(timeout.interval());
        core.last_interaction = Utc::now();
        core.lifecycle = Lifecycle::Running;

        info!(
            "Detector started: {} events watched, interval {:?}",
            core.registry.event_count(),
            timeout.interval()
        );
        drop(core);
        Ok(self)
    }

    /// Detach listeners and disarm the timer. Safe to call at any time.
    pub fn stop(&self) -> &Self {
        let mut core = self.core.borrow_mut();
        core.registry.detach(&core.listener);
        core.ticker.disarm();
        if core.lifecycle == Lifecycle::Running {
            core.lifecycle = Lifecycle::Stopped;
            info!("Detector stopped");
        }
        drop(core);
        self
    }

    pub fn state(&self) -> Lifecycle {
        self.core.borrow().lifecycle
    }

    pub fn timeout(&self) -> Timeout {
        self.core.borrow().timeout
    }

    /// Whether a timer interval is currently live.
    pub fn is_armed(&self) -> bool {
        self.core.borrow().ticker.is_armed()
    }

    /// Receive every transition this detector fires from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityState> {
        self.core.borrow().transitions.subscribe()
    }

    fn interact(&self) {
        Core::dispatch(&Rc::downgrade(&self.core), Hook::Interaction);
    }
}

impl Detector<Idle> {
    /// Keep firing after every further timeout of silence.
    pub fn repeat_firing(&self, repeat: bool) -> &Self {
        self.core.borrow_mut().policy.set_repeat(repeat);
        self
    }

    /// Reset the idle countdown as if an interaction had occurred.
    ///
    /// Has no effect unless the detector is running.
    pub fn restart(&self) -> &Self {
        self.interact();
        self
    }

    pub fn is_repeating(&self) -> bool {
        self.core.borrow().policy.repeating()
    }

    /// Build an idle detector from the `[timeout]` and `[idle]` config sections.
    pub fn from_config(host: &Host, config: &Config) -> Self {
        let detector = Self::new(host);
        detector
            .configure_timeout(config.timeout.period_count, config.timeout.unit_ms)
            .repeat_firing(config.idle.repeat);
        if config.idle.watch_default_surface {
            detector.add_default_interaction_surface();
        }
        detector
    }
}

impl Detector<Active> {
    /// Fire at the moment of interaction instead of at the period boundary.
    pub fn immediately(&self, immediate: bool) -> &Self {
        self.core.borrow_mut().policy.set_immediate(immediate);
        self
    }

    pub fn is_immediate(&self) -> bool {
        self.core.borrow().policy.immediate()
    }

    /// Build an active detector from the `[timeout]` and `[active]` config sections.
    pub fn from_config(host: &Host, config: &Config) -> Self {
        let detector = Self::new(host);
        detector
            .configure_timeout(config.timeout.period_count, config.timeout.unit_ms)
            .immediately(config.active.immediate);
        if config.active.watch_default_surface {
            detector.add_default_interaction_surface();
        }
        detector
    }
}

impl<P: Policy> Clone for Detector<P> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<P: Policy> fmt::Debug for Detector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Detector")
            .field("lifecycle", &core.lifecycle)
            .field("timeout", &core.timeout)
            .field("registry", &core.registry)
            .field("armed", &core.ticker.is_armed())
            .finish()
    }
}
