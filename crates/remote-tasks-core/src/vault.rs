//! Time vault: photo and note capsules that unlock on a chosen date.

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{OffsetDateTime, Time};

use crate::collection::{AppendOnly, Draft};
use crate::picker::{pick_one, Payload, Picker};
use crate::selection::Selection;
use crate::state::{Observable, SubscriptionId};
use crate::{Record, ValidationError};

pub const EMPTY_VAULT_MESSAGE: &str = "No time vault memories created";

record_id!(VaultEntryId);

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct TimeVaultEntry {
    pub id: VaultEntryId,
    pub photos: Vec<Vec<u8>>,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub open_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TimeVaultEntry {
    /// List title: the first non-empty line of the comment.
    #[must_use]
    pub fn title(&self) -> &str {
        self.comment.split('\n').find(|line| !line.is_empty()).unwrap_or("")
    }

    #[must_use]
    pub fn is_locked(&self, at: OffsetDateTime) -> bool {
        at < self.open_date
    }
}

impl Record for TimeVaultEntry {
    type Id = VaultEntryId;

    fn id(&self) -> VaultEntryId {
        self.id
    }
}

/// Render an open date the way the comment header shows it, e.g. `Jan 05, 2025`.
#[must_use]
pub fn format_open_date(date: OffsetDateTime) -> String {
    date.format(format_description!("[month repr:short] [day], [year]"))
        .unwrap_or_else(|_| date.date().to_string())
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TimeVaultDraft {
    pub photos: Vec<Vec<u8>>,
    pub comment: String,
    /// Defaults to the creation time when omitted.
    pub open_date: Option<OffsetDateTime>,
}

impl TimeVaultDraft {
    /// The comment without its date header line, when one was stamped.
    #[must_use]
    pub fn body(&self) -> &str {
        let Some(open_date) = self.open_date else {
            return &self.comment;
        };
        let (first, rest) = self.comment.split_once('\n').unwrap_or((&self.comment, ""));
        if first == format_open_date(open_date) {
            rest
        } else {
            &self.comment
        }
    }
}

impl Draft for TimeVaultDraft {
    type Record = TimeVaultEntry;

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("comment", self.body())]
    }

    fn validate_at(&self, now: OffsetDateTime) -> Result<(), ValidationError> {
        let start_of_today = now.replace_time(Time::MIDNIGHT);
        match self.open_date {
            Some(open_date) if open_date < start_of_today => Err(ValidationError::TooEarly {
                field: "open_date",
                earliest: format_open_date(start_of_today),
            }),
            _ => Ok(()),
        }
    }

    fn into_record(self, now: OffsetDateTime) -> TimeVaultEntry {
        TimeVaultEntry {
            id: VaultEntryId::new(),
            photos: self.photos,
            comment: self.comment,
            open_date: self.open_date.unwrap_or(now),
            created_at: now,
        }
    }
}

/// Create form: photos from the picker, a comment, and an optional open date.
#[derive(Debug, Default)]
pub struct CreateVaultForm {
    photos: Vec<Payload>,
    comment: Observable<String>,
    open_date: Option<OffsetDateTime>,
}

impl CreateVaultForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the image picker once and keep the photo it delivers.
    pub fn add_photo(&mut self, picker: &mut dyn Picker) -> bool {
        match pick_one(picker) {
            Some(photo) => {
                self.photos.push(photo);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn photos(&self) -> &[Payload] {
        &self.photos
    }

    #[must_use]
    pub fn comment(&self) -> &str {
        self.comment.get()
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment.set(comment.into());
    }

    pub fn subscribe_comment(&mut self, callback: impl FnMut(&String) + 'static) -> SubscriptionId {
        self.comment.subscribe(callback)
    }

    #[must_use]
    pub fn open_date(&self) -> Option<OffsetDateTime> {
        self.open_date
    }

    /// Set the open date and stamp it as the comment's first line,
    /// replacing any existing first line.
    pub fn choose_open_date(&mut self, date: OffsetDateTime) {
        self.open_date = Some(date);
        let header = format_open_date(date);
        self.comment.update(|comment| {
            *comment = match comment.split_once('\n') {
                Some((_, rest)) => format!("{header}\n{rest}"),
                None => format!("{header}\n"),
            };
        });
    }

    #[must_use]
    pub fn into_draft(self) -> TimeVaultDraft {
        TimeVaultDraft {
            photos: self.photos.into_iter().map(|photo| photo.bytes).collect(),
            comment: self.comment.get().clone(),
            open_date: self.open_date,
        }
    }
}

/// Vault list and entry detail screen.
#[derive(Debug, Default)]
pub struct TimeVault {
    entries: AppendOnly<TimeVaultEntry>,
    open: Selection<TimeVaultEntry>,
}

impl TimeVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[TimeVaultEntry] {
        self.entries.items()
    }

    /// Placeholder text for an empty list, if the list is empty.
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        self.entries.is_empty().then_some(EMPTY_VAULT_MESSAGE)
    }

    /// # Errors
    /// Returns [`ValidationError`] naming `comment` when blank, or
    /// `open_date` when it falls before today.
    pub fn create(&mut self, form: CreateVaultForm) -> Result<&TimeVaultEntry, ValidationError> {
        self.entries.append(form.into_draft())
    }

    /// [`TimeVault::create`] with an explicit clock reading.
    ///
    /// # Errors
    /// Same as [`TimeVault::create`].
    pub fn create_at(
        &mut self,
        form: CreateVaultForm,
        now: OffsetDateTime,
    ) -> Result<&TimeVaultEntry, ValidationError> {
        self.entries.append_at(form.into_draft(), now)
    }

    pub fn open_entry(&mut self, id: VaultEntryId) -> Option<&TimeVaultEntry> {
        let entry = self.entries.get(id)?.clone();
        self.open.select(entry);
        self.open.current()
    }

    pub fn close_entry(&mut self) -> Option<TimeVaultEntry> {
        self.open.clear()
    }

    #[must_use]
    pub fn opened(&self) -> Option<&TimeVaultEntry> {
        self.open.current()
    }

    /// Entries whose open date has passed at `at`.
    pub fn unlocked(&self, at: OffsetDateTime) -> impl Iterator<Item = &TimeVaultEntry> + '_ {
        self.entries.items().iter().filter(move |entry| !entry.is_locked(at))
    }
}
