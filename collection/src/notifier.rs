//! Per-element field change notification.

use std::cell::{Cell, RefCell};
use std::fmt;

/// Identifies one listener registered on a [`FieldNotifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&'static str)>;

/// Fan-out point an element calls when one of its fields changes.
///
/// A clone starts with no listeners; listeners belong to the instance that
/// a collection subscribed to, not to the value.
#[derive(Default)]
pub struct FieldNotifier {
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_id: Cell<u64>,
}

impl FieldNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&'static str) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Box::new(listener)));
        id
    }

    /// Returns whether `id` was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn notify(&self, field: &'static str) {
        let Ok(listeners) = self.listeners.try_borrow() else {
            tracing::warn!(field, "field change raised while listeners are being modified");
            return;
        };
        for (_, listener) in listeners.iter() {
            listener(field);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl Clone for FieldNotifier {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for FieldNotifier {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for FieldNotifier {}

impl fmt::Debug for FieldNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Elements that report their own field changes.
///
/// Implementors call `field_notifier().notify("field")` from every setter.
pub trait ObserveFields {
    fn field_notifier(&self) -> &FieldNotifier;
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_subscribe_notify_unsubscribe() {
        let notifier = FieldNotifier::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = notifier.subscribe(move |field| sink.borrow_mut().push(field));

        notifier.notify("name");
        assert_eq!(vec!["name"], *seen.borrow());

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify("name");
        assert_eq!(1, seen.borrow().len());
    }

    #[test]
    fn test_clone_drops_listeners() {
        let notifier = FieldNotifier::new();
        notifier.subscribe(|_| {});
        assert_eq!(1, notifier.listener_count());
        assert_eq!(0, notifier.clone().listener_count());
    }
}
