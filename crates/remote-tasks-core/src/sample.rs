use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::Record;

/// Immutable seed list shared by every screen in the process.
///
/// Cloning is cheap: clones share one backing slice.
pub struct SampleStore<R> {
    records: Arc<[R]>,
}

impl<R> SampleStore<R> {
    #[must_use]
    pub fn new(records: Vec<R>) -> Self {
        Self { records: records.into() }
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record> SampleStore<R> {
    #[must_use]
    pub fn get(&self, id: R::Id) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }
}

impl<R> Clone for SampleStore<R> {
    fn clone(&self) -> Self {
        Self { records: Arc::clone(&self.records) }
    }
}

impl<R: Debug> Debug for SampleStore<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.records.iter()).finish()
    }
}

impl<R> FromIterator<R> for SampleStore<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
