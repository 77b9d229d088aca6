//! Subscribers
//!
//! Change listeners shared by the stores. Listeners run synchronously, in the order
//! they were registered, after each committed change.

use std::fmt;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle returned by `subscribe`, used to unsubscribe.
    pub struct SubscriptionKey;
}

type Listener<T> = Box<dyn FnMut(&T)>;

/// Registered listeners for a value of type `T`.
pub struct Subscribers<T> {
    keys: SlotMap<SubscriptionKey, ()>,
    listeners: Vec<(SubscriptionKey, Listener<T>)>,
}

impl<T> Subscribers<T> {
    /// Create an empty listener set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: SlotMap::with_key(),
            listeners: Vec::new(),
        }
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionKey {
        let key = self.keys.insert(());

        self.listeners.push((key, Box::new(listener)));

        key
    }

    /// Remove a listener. Returns `false` if the key was unknown.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        if self.keys.remove(key).is_none() {
            return false;
        }

        self.listeners.retain(|(listener_key, _)| *listener_key != key);

        true
    }

    /// Call every listener with `value`.
    pub fn notify(&mut self, value: &T) {
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.listeners.len())
            .finish()
    }
}
