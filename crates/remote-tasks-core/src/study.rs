//! Study groups: a growing group list, per-group file sharing, and a live
//! chat session.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::collection::{AppendOnly, Draft};
use crate::picker::{pick_one, Picker};
use crate::sample::SampleStore;
use crate::selection::Selection;
use crate::state::{Observable, SubscriptionId};
use crate::{Record, ValidationError};

/// Sender name stamped on messages typed into the composer.
pub const LOCAL_SENDER: &str = "Your User";

record_id!(StudyGroupId);
record_id!(ChatMessageId);
record_id!(SharedFileId);

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct StudyGroup {
    pub id: StudyGroupId,
    pub name: String,
    pub description: String,
}

impl Record for StudyGroup {
    type Id = StudyGroupId;

    fn id(&self) -> StudyGroupId {
        self.id
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct StudyGroupDraft {
    pub name: String,
    pub description: String,
}

impl Draft for StudyGroupDraft {
    type Record = StudyGroup;

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str()), ("description", self.description.as_str())]
    }

    fn into_record(self, _now: OffsetDateTime) -> StudyGroup {
        StudyGroup { id: StudyGroupId::new(), name: self.name, description: self.description }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub sender: String,
    pub text: String,
}

impl Record for ChatMessage {
    type Id = ChatMessageId;

    fn id(&self) -> ChatMessageId {
        self.id
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MessageDraft {
    pub sender: String,
    pub text: String,
}

impl Draft for MessageDraft {
    type Record = ChatMessage;

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("sender", self.sender.as_str()), ("text", self.text.as_str())]
    }

    fn into_record(self, _now: OffsetDateTime) -> ChatMessage {
        ChatMessage { id: ChatMessageId::new(), sender: self.sender, text: self.text }
    }
}

/// A file uploaded to a study group. The bytes are opaque.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SharedFile {
    pub id: SharedFileId,
    pub group_id: StudyGroupId,
    pub file_name: String,
    pub bytes: Vec<u8>,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

impl Record for SharedFile {
    type Id = SharedFileId;

    fn id(&self) -> SharedFileId {
        self.id
    }
}

struct SharedFileDraft {
    group_id: StudyGroupId,
    file_name: String,
    bytes: Vec<u8>,
}

impl Draft for SharedFileDraft {
    type Record = SharedFile;

    fn required_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("file_name", self.file_name.as_str())]
    }

    fn into_record(self, now: OffsetDateTime) -> SharedFile {
        SharedFile {
            id: SharedFileId::new(),
            group_id: self.group_id,
            file_name: self.file_name,
            bytes: self.bytes,
            uploaded_at: now,
        }
    }
}

#[must_use]
pub fn sample_groups() -> SampleStore<StudyGroup> {
    static GROUPS: OnceLock<SampleStore<StudyGroup>> = OnceLock::new();
    GROUPS
        .get_or_init(|| {
            [
                ("Calculus 101", "Calculus study group"),
                ("Intro to Biology", "Biology topics overview"),
                ("Web Development", "Learning web technologies"),
            ]
            .into_iter()
            .map(|(name, description)| StudyGroup {
                id: StudyGroupId::new(),
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect()
        })
        .clone()
}

#[must_use]
pub fn sample_messages() -> SampleStore<ChatMessage> {
    static MESSAGES: OnceLock<SampleStore<ChatMessage>> = OnceLock::new();
    MESSAGES
        .get_or_init(|| {
            [("User A", "Hello, everyone!"), ("User B", "Hi, how's it going?")]
                .into_iter()
                .map(|(sender, text)| ChatMessage {
                    id: ChatMessageId::new(),
                    sender: sender.to_string(),
                    text: text.to_string(),
                })
                .collect()
        })
        .clone()
}

/// Live chat for one group. Messages live only as long as the session.
#[derive(Debug)]
pub struct ChatSession {
    group_name: String,
    messages: AppendOnly<ChatMessage>,
    composer: Observable<String>,
}

impl ChatSession {
    #[must_use]
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            messages: AppendOnly::seeded(sample_messages().records().to_vec()),
            composer: Observable::default(),
        }
    }

    #[must_use]
    pub fn title(&self) -> String {
        format!("Live Session: {}", self.group_name)
    }

    #[must_use]
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        self.messages.items()
    }

    #[must_use]
    pub fn composer(&self) -> &str {
        self.composer.get()
    }

    pub fn set_composer(&mut self, text: impl Into<String>) {
        self.composer.set(text.into());
    }

    pub fn subscribe_messages(
        &mut self,
        callback: impl FnMut(&Vec<ChatMessage>) + 'static,
    ) -> SubscriptionId {
        self.messages.subscribe(callback)
    }

    /// Send the composer text as [`LOCAL_SENDER`]. The composer is cleared
    /// only when the message is accepted.
    ///
    /// # Errors
    /// Returns [`ValidationError`] naming `text` when the composer is blank.
    pub fn send(&mut self) -> Result<&ChatMessage, ValidationError> {
        let draft =
            MessageDraft { sender: LOCAL_SENDER.to_string(), text: self.composer.get().clone() };
        let message = self.messages.append(draft)?;
        self.composer.set(String::new());
        Ok(message)
    }
}

/// Study group list, group detail, and file sharing.
#[derive(Debug)]
pub struct StudyHive {
    groups: AppendOnly<StudyGroup>,
    open: Selection<StudyGroup>,
    files: BTreeMap<StudyGroupId, AppendOnly<SharedFile>>,
}

impl StudyHive {
    #[must_use]
    pub fn new(seed: &SampleStore<StudyGroup>) -> Self {
        Self {
            groups: AppendOnly::seeded(seed.records().to_vec()),
            open: Selection::new(),
            files: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn groups(&self) -> &[StudyGroup] {
        self.groups.items()
    }

    /// # Errors
    /// Returns [`ValidationError`] naming `name` or `description` when blank.
    pub fn create_group(&mut self, draft: StudyGroupDraft) -> Result<&StudyGroup, ValidationError> {
        self.groups.append(draft)
    }

    pub fn subscribe_groups(
        &mut self,
        callback: impl FnMut(&Vec<StudyGroup>) + 'static,
    ) -> SubscriptionId {
        self.groups.subscribe(callback)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&StudyGroup> {
        self.groups.items().iter().find(|group| group.name == name)
    }

    pub fn open_group(&mut self, id: StudyGroupId) -> Option<&StudyGroup> {
        let group = self.groups.get(id)?.clone();
        self.open.select(group);
        self.open.current()
    }

    pub fn close_group(&mut self) -> Option<StudyGroup> {
        self.open.clear()
    }

    #[must_use]
    pub fn open(&self) -> Option<&StudyGroup> {
        self.open.current()
    }

    /// Start a chat session for the open group.
    #[must_use]
    pub fn join_session(&self) -> Option<ChatSession> {
        self.open.current().map(|group| ChatSession::new(group.name.clone()))
    }

    /// Run `picker` and attach what it delivers to the open group.
    ///
    /// Returns `Ok(None)` when no group is open or the picker was dismissed.
    ///
    /// # Errors
    /// Returns [`ValidationError`] naming `file_name` when the payload has no name.
    pub fn upload_file(
        &mut self,
        picker: &mut dyn Picker,
    ) -> Result<Option<&SharedFile>, ValidationError> {
        let Some(group_id) = self.open.current().map(|group| group.id) else {
            tracing::warn!("ignored file upload without an open group");
            return Ok(None);
        };
        let Some(payload) = pick_one(picker) else {
            return Ok(None);
        };

        let draft = SharedFileDraft {
            group_id,
            file_name: payload.file_name.unwrap_or_default(),
            bytes: payload.bytes,
        };
        self.files.entry(group_id).or_default().append(draft).map(Some)
    }

    #[must_use]
    pub fn shared_files(&self, group_id: StudyGroupId) -> &[SharedFile] {
        self.files.get(&group_id).map(AppendOnly::items).unwrap_or(&[])
    }
}

impl Default for StudyHive {
    fn default() -> Self {
        Self::new(&sample_groups())
    }
}
