//! Listener-based event targets.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

/// A listener attached to an event source.
///
/// Listeners are compared by `Rc` identity, so removal must pass the same
/// `Rc` that was used to attach.
pub type Listener = Rc<dyn Fn()>;

/// Something that emits named events to attached listeners.
pub trait EventSource {
    /// Attach `listener` for `event`.
    fn add_listener(&self, event: &str, listener: Listener);

    /// Detach `listener` from `event`. Unknown listeners are ignored.
    fn remove_listener(&self, event: &str, listener: &Listener);
}

/// In-process event target.
///
/// Attaching the same listener twice for the same event is a no-op, so
/// repeated attachment never multiplies dispatches.
#[derive(Default)]
pub struct EventTarget {
    name: String,
    listeners: RefCell<HashMap<String, Vec<Listener>>>,
}

impl EventTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of listeners attached for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Deliver `event` to every listener attached for it.
    ///
    /// Listeners are snapshotted first; a listener may attach or detach
    /// others while the event is being delivered.
    pub fn dispatch(&self, event: &str) {
        let snapshot: Vec<Listener> = match self.listeners.borrow().get(event) {
            Some(listeners) => listeners.clone(),
            None => return,
        };

        trace!(source = %self.name, event, listeners = snapshot.len(), "Dispatching event");
        for listener in snapshot {
            listener();
        }
    }
}

impl EventSource for EventTarget {
    fn add_listener(&self, event: &str, listener: Listener) {
        let mut listeners = self.listeners.borrow_mut();
        let attached = listeners.entry(event.to_string()).or_default();
        if !attached.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            attached.push(listener);
        }
    }

    fn remove_listener(&self, event: &str, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(attached) = listeners.get_mut(event) {
            attached.retain(|l| !Rc::ptr_eq(l, listener));
            if attached.is_empty() {
                listeners.remove(event);
            }
        }
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<String> = self.listeners.borrow().keys().cloned().collect();
        events.sort();
        f.debug_struct("EventTarget")
            .field("name", &self.name)
            .field("events", &events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, Listener) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, Rc::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn dispatch_reaches_only_matching_event() {
        let target = EventTarget::new("button");
        let (count, listener) = counter();
        target.add_listener("click", listener);

        target.dispatch("click");
        target.dispatch("keydown");

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn name_labels_the_target() {
        let target = EventTarget::new("document");
        target.add_listener("click", counter().1);

        assert_eq!(target.name(), "document");
        assert_eq!(
            format!("{target:?}"),
            r#"EventTarget { name: "document", events: ["click"] }"#
        );
    }

    #[test]
    fn duplicate_attachment_is_ignored() {
        let target = EventTarget::new("document");
        let (count, listener) = counter();
        target.add_listener("click", listener.clone());
        target.add_listener("click", listener);

        target.dispatch("click");

        assert_eq!(target.listener_count("click"), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn removal_matches_listener_identity() {
        let target = EventTarget::new("document");
        let (first_count, first) = counter();
        let (second_count, second) = counter();
        target.add_listener("scroll", first.clone());
        target.add_listener("scroll", second);

        target.remove_listener("scroll", &first);
        target.dispatch("scroll");

        assert_eq!(first_count.get(), 0);
        assert_eq!(second_count.get(), 1);
    }

    #[test]
    fn removing_unknown_listener_is_noop() {
        let target = EventTarget::new("document");
        let (_, listener) = counter();
        target.remove_listener("click", &listener);
        assert_eq!(target.listener_count("click"), 0);
    }

    #[test]
    fn listener_may_detach_itself_during_dispatch() {
        let target = Rc::new(EventTarget::new("document"));
        let count = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Listener>>> = Rc::new(RefCell::new(None));

        let listener: Listener = {
            let target = Rc::downgrade(&target);
            let count = count.clone();
            let slot = slot.clone();
            Rc::new(move || {
                count.set(count.get() + 1);
                if let (Some(target), Some(me)) = (target.upgrade(), slot.borrow().as_ref()) {
                    target.remove_listener("click", me);
                }
            })
        };
        *slot.borrow_mut() = Some(listener.clone());
        target.add_listener("click", listener);

        target.dispatch("click");
        target.dispatch("click");

        assert_eq!(count.get(), 1);
    }
}
