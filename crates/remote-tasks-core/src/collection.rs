use std::fmt::{Debug, Formatter};

use time::OffsetDateTime;

use crate::state::{Observable, SubscriptionId};
use crate::{Record, ValidationError};

/// Candidate fields collected by a create form.
pub trait Draft {
    type Record: Record;

    /// `(field name, value)` pairs that MUST be non-empty after trimming.
    fn required_fields(&self) -> Vec<(&'static str, &str)>;

    /// Extra checks beyond required text, evaluated at `now`.
    ///
    /// # Errors
    /// Returns [`ValidationError`] naming the rejected field.
    fn validate_at(&self, _now: OffsetDateTime) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Build the record with a fresh identifier, filling omitted defaults from `now`.
    fn into_record(self, now: OffsetDateTime) -> Self::Record;
}

/// Check that every required field is non-empty after trimming.
///
/// # Errors
/// Returns [`ValidationError::EmptyField`] for the first empty field.
pub fn validate_required(fields: &[(&'static str, &str)]) -> Result<(), ValidationError> {
    for &(field, value) in fields {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField { field });
        }
    }
    Ok(())
}

/// Ordered in-memory list that only grows through validated appends.
pub struct AppendOnly<R> {
    items: Observable<Vec<R>>,
}

impl<R: Record> AppendOnly<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::seeded(Vec::new())
    }

    #[must_use]
    pub fn seeded(items: Vec<R>) -> Self {
        Self { items: Observable::new(items) }
    }

    #[must_use]
    pub fn items(&self) -> &[R] {
        self.items.get()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.get().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.get().is_empty()
    }

    #[must_use]
    pub fn get(&self, id: R::Id) -> Option<&R> {
        self.items.get().iter().find(|item| item.id() == id)
    }

    /// Validate `draft` and append the resulting record at the tail.
    ///
    /// # Errors
    /// Returns [`ValidationError`] and leaves the collection untouched when a
    /// required field is empty or the draft's own checks fail.
    pub fn append<D>(&mut self, draft: D) -> Result<&R, ValidationError>
    where
        D: Draft<Record = R>,
    {
        self.append_at(draft, OffsetDateTime::now_utc())
    }

    /// [`AppendOnly::append`] with an explicit clock reading.
    ///
    /// # Errors
    /// Same as [`AppendOnly::append`].
    pub fn append_at<D>(&mut self, draft: D, now: OffsetDateTime) -> Result<&R, ValidationError>
    where
        D: Draft<Record = R>,
    {
        if let Err(err) =
            validate_required(&draft.required_fields()).and_then(|()| draft.validate_at(now))
        {
            tracing::debug!(field = err.field(), "rejected append");
            return Err(err);
        }

        let record = draft.into_record(now);
        let id = record.id();
        let index = self.items.update(|items| {
            items.push(record);
            items.len() - 1
        });
        tracing::info!(%id, len = index + 1, "appended record");
        Ok(&self.items.get()[index])
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&Vec<R>) + 'static) -> SubscriptionId {
        self.items.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.items.unsubscribe(id)
    }
}

impl<R: Record> Default for AppendOnly<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Debug> Debug for AppendOnly<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.items.get().iter()).finish()
    }
}
