//! Change subscription for stores.
//!
//! # Responsibility
//! - Deliver one `StoreChange` per committed state transition.
//! - Hand out `Subscription` handles that detach their listener on drop.
//!
//! # Invariants
//! - Listeners are called in subscription order.
//! - A listener unsubscribed during delivery is not called again, and a
//!   listener subscribed during delivery first hears the next change.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Which store emitted a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Boards,
    Columns,
    Tasks,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boards => "boards",
            Self::Columns => "columns",
            Self::Tasks => "tasks",
        }
    }
}

/// What happened in one state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Loaded { count: usize },
    Created(Uuid),
    Updated(Uuid),
    Deleted(Vec<Uuid>),
    /// One or more order-arrays owned by the listed entities changed.
    Reordered(Vec<Uuid>),
    Moved {
        id: Uuid,
        from: Uuid,
        to: Uuid,
        index: usize,
    },
    Selected(Option<Uuid>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub store: StoreKind,
    /// Store version after the transition.
    pub version: u64,
    pub kind: ChangeKind,
}

type Listener = Box<dyn FnMut(&StoreChange)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    emitting: bool,
    removed_while_emitting: Vec<u64>,
}

/// Listener registry owned by one store.
#[derive(Default)]
pub struct ChangeNotifier {
    registry: Rc<RefCell<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut(&StoreChange) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn emit(&self, change: &StoreChange) {
        let mut active = {
            let mut registry = self.registry.borrow_mut();
            registry.emitting = true;
            std::mem::take(&mut registry.listeners)
        };

        for (id, listener) in active.iter_mut() {
            let removed = self
                .registry
                .borrow()
                .removed_while_emitting
                .contains(id);
            if !removed {
                listener(change);
            }
        }

        let mut registry = self.registry.borrow_mut();
        let removed = std::mem::take(&mut registry.removed_while_emitting);
        active.retain(|(id, _)| !removed.contains(id));
        active.append(&mut registry.listeners);
        registry.listeners = active;
        registry.emitting = false;
    }
}

/// Handle returned by `subscribe`; dropping it detaches the listener.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let Ok(mut registry) = registry.try_borrow_mut() else {
            return;
        };
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        if registry.listeners.len() == before && registry.emitting {
            registry.removed_while_emitting.push(self.id);
        }
    }
}
