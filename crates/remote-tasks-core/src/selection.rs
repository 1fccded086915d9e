use std::fmt::{Debug, Formatter};

use crate::state::{Observable, SubscriptionId};
use crate::Record;

/// Holds zero or one selected record for a detail view.
///
/// Selection is last-write-wins and is not checked against any store.
pub struct Selection<R> {
    state: Observable<Option<R>>,
}

impl<R: Record> Selection<R> {
    #[must_use]
    pub fn new() -> Self {
        Self { state: Observable::new(None) }
    }

    pub fn select(&mut self, record: R) {
        tracing::debug!(id = %record.id(), "selected record");
        self.state.set(Some(record));
    }

    /// Clear the selection, returning what was selected.
    pub fn clear(&mut self) -> Option<R> {
        let previous = self.state.set(None);
        if let Some(record) = &previous {
            tracing::debug!(id = %record.id(), "cleared selection");
        }
        previous
    }

    #[must_use]
    pub fn current(&self) -> Option<&R> {
        self.state.get().as_ref()
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.state.get().is_none()
    }

    pub fn subscribe(&mut self, mut callback: impl FnMut(Option<&R>) + 'static) -> SubscriptionId
    where
        R: 'static,
    {
        self.state.subscribe(move |value: &Option<R>| callback(value.as_ref()))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }
}

impl<R: Record> Default for Selection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Debug> Debug for Selection<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Selection").field(self.state.get()).finish()
    }
}
