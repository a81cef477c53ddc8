//! Notifications to the host.

use std::fmt;

use crate::mode::Mode;
use crate::point::GeoPoint;

/// Why the set of boundaries changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Edit,
    Remove,
    Clear,
    Undo,
    Redo,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Mode(Mode),
    /// Every live boundary as a closed ring, in geographic coordinates.
    Markers {
        rings: Vec<Vec<GeoPoint>>,
        kind: ChangeKind,
    },
    /// The number of live polygons changed.
    Count(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&Event)>;

/// Registered event listeners, called in registration order.
#[derive(Default)]
pub struct Observers {
    next: usize,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Observers {
    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &Event) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observers({})", self.listeners.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribe_emit_unsubscribe() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        let sink = Rc::clone(&seen);
        let id = observers.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        observers.emit(&Event::Count(2));
        assert_eq!(*seen.borrow(), vec![Event::Count(2)]);

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.emit(&Event::Count(3));
        assert_eq!(seen.borrow().len(), 1);
    }
}
