//! Synchronous get/set/subscribe state holder.
//!
//! Screen models keep their live fields (selection, search text, composer
//! text, collections) in an [`Observable`]. A rendering layer subscribes to
//! the holders it draws; callbacks run inline after every change, in the
//! order they were registered.

use std::fmt::{Debug, Formatter};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

pub struct Observable<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { value, next_id: 0, subscribers: Vec::new() }
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value, notify subscribers, and hand back the previous value.
    pub fn set(&mut self, value: T) -> T {
        let previous = std::mem::replace(&mut self.value, value);
        self.notify();
        previous
    }

    /// Mutate the value in place, then notify subscribers once.
    pub fn update<U>(&mut self, mutate: impl FnOnce(&mut T) -> U) -> U {
        let out = mutate(&mut self.value);
        self.notify();
        out
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Drop one subscriber. Returns `false` when the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        let Self { value, subscribers, .. } = self;
        for (_, callback) in subscribers.iter_mut() {
            callback(value);
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for Observable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}
