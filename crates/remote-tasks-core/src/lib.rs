//! Headless screen models for the Remote Tasks demo apps.
//!
//! Every app follows the same shape: an immutable [`SampleStore`] of seed
//! records, a [`Search`] over one string field, a [`Selection`] feeding a
//! detail view, an [`AppendOnly`] collection grown by create forms, and for
//! the weather app a [`FavoriteSet`] persisted through a [`SettingsStore`].

use std::fmt::Display;
use std::hash::Hash;

/// Declare a ULID-backed identifier type for one record kind.
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            ::serde::Serialize,
            ::serde::Deserialize,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        pub struct $name(pub ::ulid::Ulid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(::ulid::Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub mod collection;
pub mod favorites;
pub mod filter;
pub mod picker;
pub mod sample;
pub mod selection;
pub mod state;
pub mod study;
pub mod tutorial;
pub mod vault;
pub mod video;
pub mod weather;

pub use collection::{validate_required, AppendOnly, Draft};
pub use favorites::{FavoriteSet, MemorySettings, SettingsStore, FAVORITE_LOCATIONS_KEY};
pub use filter::{contains_ignore_case, filter, FieldSelector, Search};
pub use picker::{pick_one, Payload, Picker, PreloadedPicker};
pub use sample::SampleStore;
pub use selection::Selection;
pub use state::{Observable, SubscriptionId};

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum ValidationError {
    #[error("{field} MUST be non-empty")]
    EmptyField { field: &'static str },
    #[error("{field} MUST NOT be earlier than {earliest}")]
    TooEarly { field: &'static str, earliest: String },
}

impl ValidationError {
    /// Name of the candidate field that failed validation.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } | Self::TooEarly { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum SettingsError {
    #[error("settings backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// A domain item with an identifier that is unique within its kind.
pub trait Record {
    type Id: Copy + Eq + Ord + Hash + Display;

    fn id(&self) -> Self::Id;
}
