//! Interaction bindings watched by a detector.

use std::fmt;
use std::rc::Rc;

use crate::host::{EventSource, Listener, DEFAULT_DOCUMENT_EVENTS};

/// One watched target and the event names that count as interaction on it.
#[derive(Clone)]
pub struct Interaction {
    pub target: Rc<dyn EventSource>,
    pub events: Vec<String>,
}

impl Interaction {
    pub fn new<I, S>(target: Rc<dyn EventSource>, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target,
            events: events.into_iter().map(Into::into).collect(),
        }
    }

    /// The default surface: generic input events on `document`.
    pub fn default_surface(document: Rc<dyn EventSource>) -> Self {
        Self::new(document, DEFAULT_DOCUMENT_EVENTS)
    }
}

impl fmt::Debug for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Ordered set of bindings. Duplicates are kept as registered.
#[derive(Debug, Default)]
pub(crate) struct InteractionRegistry {
    bindings: Vec<Interaction>,
}

impl InteractionRegistry {
    pub(crate) fn push(&mut self, interaction: Interaction) {
        self.bindings.push(interaction);
    }

    pub(crate) fn extend(&mut self, interactions: impl IntoIterator<Item = Interaction>) {
        self.bindings.extend(interactions);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Total (target, event) pairs.
    pub(crate) fn event_count(&self) -> usize {
        self.bindings.iter().map(|b| b.events.len()).sum()
    }

    pub(crate) fn attach(&self, listener: &Listener) {
        for binding in &self.bindings {
            for event in &binding.events {
                binding.target.add_listener(event, listener.clone());
            }
        }
    }

    pub(crate) fn detach(&self, listener: &Listener) {
        for binding in &self.bindings {
            for event in &binding.events {
                binding.target.remove_listener(event, listener);
            }
        }
    }
}
