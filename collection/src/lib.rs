//! # pkicodec-collection
//!
//! An insertion-ordered collection that tells its subscribers about every
//! change and can be closed against further mutation.
//!
//! ```text
//!          close()
//!   Open ──────────▶ Closed
//!     ▲                │
//!     └──── clear() ───┘
//! ```
//!
//! Every successful mutation emits one change notification (`Added`,
//! `Removed`, `Replaced` or `Reset`) followed by `CountChanged`. A collection
//! built with [`ObservableCollection::notifying`] additionally forwards field
//! changes of its elements as `ChildChanged`.
//!
//! The collection is single threaded (`Rc`/`RefCell` inside).

#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

pub mod error;
mod notifier;

pub use error::{Error, NotSupported, Result};
pub use notifier::{FieldNotifier, ListenerId, ObserveFields};

/// A change reported to subscribers.
#[derive(Debug, PartialEq, Eq)]
pub enum Notification<'a, T> {
    Added { index: usize, items: &'a [T] },
    Removed { index: usize, items: &'a [T] },
    Replaced { index: usize, old: &'a T, new: &'a T },
    Reset,
    CountChanged { count: usize },
    ChildChanged { field: &'static str },
}

impl<T> Notification<'_, T> {
    /// Whether a subscriber may answer this with `NotSupported` and get a
    /// `Reset` instead.
    pub fn is_granular(&self) -> bool {
        matches!(
            self,
            Notification::Added { .. }
                | Notification::Removed { .. }
                | Notification::Replaced { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Open,
    Closed,
}

type Subscriber<T> =
    Box<dyn FnMut(&Notification<'_, T>) -> std::result::Result<(), NotSupported>>;

struct Shared<T> {
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
    next_id: Cell<u64>,
}

impl<T> Shared<T> {
    fn new() -> Self {
        Shared {
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    fn emit(&self, notification: &Notification<'_, T>) {
        let Ok(mut subscribers) = self.subscribers.try_borrow_mut() else {
            tracing::warn!("notification raised from inside a subscriber was dropped");
            return;
        };
        for (id, subscriber) in subscribers.iter_mut() {
            if subscriber(notification).is_ok() {
                continue;
            }
            if notification.is_granular() {
                tracing::debug!(subscriber = id.0, "granular notification rejected, sending reset");
                // A subscriber that refuses Reset as well has nothing left to try.
                let _ = subscriber(&Notification::Reset);
            } else {
                tracing::trace!(subscriber = id.0, "notification rejected");
            }
        }
    }
}

/// Hooks into the element's field notifier, present in notifying mode.
struct FieldHooks<T> {
    subscribe: fn(&T, Weak<Shared<T>>) -> ListenerId,
    unsubscribe: fn(&T, ListenerId),
}

fn subscribe_fields<T: ObserveFields + 'static>(item: &T, shared: Weak<Shared<T>>) -> ListenerId {
    item.field_notifier().subscribe(move |field| {
        if let Some(shared) = shared.upgrade() {
            shared.emit(&Notification::ChildChanged { field });
        }
    })
}

fn unsubscribe_fields<T: ObserveFields>(item: &T, id: ListenerId) {
    item.field_notifier().unsubscribe(id);
}

pub struct ObservableCollection<T> {
    items: Vec<T>,
    // Parallel to `items`; only populated in notifying mode.
    listeners: Vec<Option<ListenerId>>,
    state: State,
    shared: Rc<Shared<T>>,
    hooks: Option<FieldHooks<T>>,
}

impl<T> Default for ObservableCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObservableCollection<T> {
    pub fn new() -> Self {
        ObservableCollection {
            items: Vec::new(),
            listeners: Vec::new(),
            state: State::Open,
            shared: Rc::new(Shared::new()),
            hooks: None,
        }
    }

    /// A collection that also reports field changes of its elements.
    pub fn notifying() -> Self
    where
        T: ObserveFields + 'static,
    {
        ObservableCollection {
            hooks: Some(FieldHooks {
                subscribe: subscribe_fields::<T>,
                unsubscribe: unsubscribe_fields::<T>,
            }),
            ..Self::new()
        }
    }

    pub fn is_notifying(&self) -> bool {
        self.hooks.is_some()
    }

    /// Registers a change subscriber.
    ///
    /// # Panics
    ///
    /// When called from inside a subscriber.
    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Notification<'_, T>) -> std::result::Result<(), NotSupported> + 'static,
    {
        let id = SubscriptionId(self.shared.next_id.get());
        self.shared.next_id.set(id.0 + 1);
        self.shared
            .subscribers
            .borrow_mut()
            .push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.shared.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Rejects further mutation until [`clear`](Self::clear) is called.
    pub fn close(&mut self) {
        tracing::debug!(len = self.items.len(), "collection closed");
        self.state = State::Closed;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Mutable access for field edits. Not gated by the closed state.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(item)
    }

    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().position(predicate)
    }

    pub fn add(&mut self, item: T) -> Result<()> {
        self.check_open("add")?;
        let index = self.items.len();
        let listener = self.attach(&item);
        self.listeners.push(listener);
        self.items.push(item);
        self.changed(Notification::Added {
            index,
            items: &self.items[index..],
        });
        Ok(())
    }

    /// Appends every item and reports them as a single `Added`.
    pub fn add_range<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.check_open("add_range")?;
        let index = self.items.len();
        for item in items {
            let listener = self.attach(&item);
            self.listeners.push(listener);
            self.items.push(item);
        }
        if self.items.len() == index {
            return Ok(());
        }
        self.changed(Notification::Added {
            index,
            items: &self.items[index..],
        });
        Ok(())
    }

    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        self.check_open("insert")?;
        if index > self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let listener = self.attach(&item);
        self.listeners.insert(index, listener);
        self.items.insert(index, item);
        self.changed(Notification::Added {
            index,
            items: std::slice::from_ref(&self.items[index]),
        });
        Ok(())
    }

    /// Removes the first element equal to `item`. Returns whether one was found.
    pub fn remove(&mut self, item: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        self.check_open("remove")?;
        match self.items.iter().position(|i| i == item) {
            Some(index) => self.remove_at(index).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.check_open("remove_at")?;
        self.check_index(index)?;
        let item = self.items.remove(index);
        let listener = self.listeners.remove(index);
        self.detach(&item, listener);
        self.changed(Notification::Removed {
            index,
            items: std::slice::from_ref(&item),
        });
        Ok(item)
    }

    /// Replaces the element at `index` and returns the old one.
    pub fn set(&mut self, index: usize, item: T) -> Result<T> {
        self.check_open("set")?;
        self.check_index(index)?;
        let listener = self.attach(&item);
        let old = std::mem::replace(&mut self.items[index], item);
        let old_listener = std::mem::replace(&mut self.listeners[index], listener);
        self.detach(&old, old_listener);
        self.changed(Notification::Replaced {
            index,
            old: &old,
            new: &self.items[index],
        });
        Ok(old)
    }

    /// Empties the collection and reopens it. Always allowed.
    pub fn clear(&mut self) {
        let items = std::mem::take(&mut self.items);
        let listeners = std::mem::take(&mut self.listeners);
        for (item, listener) in items.iter().zip(listeners) {
            self.detach(item, listener);
        }
        self.state = State::Open;
        self.changed(Notification::Reset);
    }

    fn changed(&self, notification: Notification<'_, T>) {
        self.shared.emit(&notification);
        self.shared.emit(&Notification::CountChanged {
            count: self.items.len(),
        });
    }

    fn check_open(&self, operation: &'static str) -> Result<()> {
        if self.is_closed() {
            tracing::debug!(operation, "rejected: collection is closed");
            return Err(Error::CollectionClosed);
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn attach(&self, item: &T) -> Option<ListenerId> {
        self.hooks
            .as_ref()
            .map(|hooks| (hooks.subscribe)(item, Rc::downgrade(&self.shared)))
    }

    fn detach(&self, item: &T, listener: Option<ListenerId>) {
        if let (Some(hooks), Some(id)) = (self.hooks.as_ref(), listener) {
            (hooks.unsubscribe)(item, id);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCollection")
            .field("items", &self.items)
            .field("state", &self.state)
            .field("notifying", &self.is_notifying())
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a ObservableCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
