//! Favorite keys persisted through an injected key-value settings store.

use std::collections::{BTreeMap, BTreeSet};

use crate::{CoreError, SettingsError};

/// Settings key holding the favorite location names.
pub const FAVORITE_LOCATIONS_KEY: &str = "locations";

/// Flat key-value store holding string lists.
pub trait SettingsStore {
    /// Read the list stored under `key`, or `None` when the key was never written.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, SettingsError>;

    /// Replace the list stored under `key`.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the backend cannot be written.
    fn set(&mut self, key: &str, value: &[String]) -> Result<(), SettingsError>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, SettingsError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[String]) -> Result<(), SettingsError> {
        (**self).set(key, value)
    }
}

/// In-process settings store, used as a test double and for ephemeral runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySettings {
    values: BTreeMap<String, Vec<String>>,
    writes: usize,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls served so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[String]) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// Deduplicated set of string keys with toggle membership.
///
/// There is no cache: every lookup re-reads the backing store. A missing
/// list is treated as empty.
#[derive(Debug)]
pub struct FavoriteSet<S> {
    store: S,
    key: String,
}

impl<S: SettingsStore> FavoriteSet<S> {
    #[must_use]
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    /// Favorite location names stored under [`FAVORITE_LOCATIONS_KEY`].
    #[must_use]
    pub fn locations(store: S) -> Self {
        Self::new(store, FAVORITE_LOCATIONS_KEY)
    }

    /// Flip membership of `key` and persist the full list.
    ///
    /// Returns the new membership. Keys are trimmed first; a blank key is a
    /// no-op that reports `false` without touching the store.
    ///
    /// # Errors
    /// Returns [`CoreError::Settings`] when the backing store fails.
    pub fn toggle(&mut self, key: &str) -> Result<bool, CoreError> {
        let key = key.trim();
        if key.is_empty() {
            tracing::warn!(settings_key = %self.key, "ignored favorite toggle without a key");
            return Ok(false);
        }

        let mut saved = self.ordered()?;
        let member = if let Some(position) = saved.iter().position(|existing| existing == key) {
            saved.remove(position);
            false
        } else {
            saved.push(key.to_string());
            true
        };
        self.store.set(&self.key, &saved)?;
        tracing::info!(settings_key = %self.key, favorite = key, member, "toggled favorite");
        Ok(member)
    }

    /// # Errors
    /// Returns [`CoreError::Settings`] when the backing store fails.
    pub fn is_member(&self, key: &str) -> Result<bool, CoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(false);
        }
        Ok(self.read()?.iter().any(|existing| existing == key))
    }

    /// # Errors
    /// Returns [`CoreError::Settings`] when the backing store fails.
    pub fn all(&self) -> Result<BTreeSet<String>, CoreError> {
        Ok(self.read()?.into_iter().collect())
    }

    /// Favorites in the order they were added, duplicates dropped.
    ///
    /// # Errors
    /// Returns [`CoreError::Settings`] when the backing store fails.
    pub fn ordered(&self) -> Result<Vec<String>, CoreError> {
        let mut seen = BTreeSet::new();
        Ok(self.read()?.into_iter().filter(|key| seen.insert(key.clone())).collect())
    }

    #[must_use]
    pub fn settings_key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.store
    }

    fn read(&self) -> Result<Vec<String>, SettingsError> {
        Ok(self.store.get(&self.key)?.unwrap_or_default())
    }
}
