//! Single-shot contract for file and image pickers.
//!
//! A picker is handed a completion callback and calls it at most once. The
//! payload is opaque; nothing here inspects its format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Payload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Payload {
    #[must_use]
    pub fn new(file_name: Option<String>, bytes: Vec<u8>) -> Self {
        Self { file_name, bytes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub trait Picker {
    /// Present the picker. Implementations call `on_picked` zero or one time.
    fn pick(&mut self, on_picked: &mut dyn FnMut(Payload));
}

/// Run `picker` and keep the first payload it delivers.
///
/// Extra completions are dropped and logged; a dismissed picker yields `None`.
pub fn pick_one(picker: &mut dyn Picker) -> Option<Payload> {
    let mut picked: Option<Payload> = None;
    let mut ignored = 0_usize;
    picker.pick(&mut |payload: Payload| {
        if picked.is_none() {
            picked = Some(payload);
        } else {
            ignored += 1;
        }
    });

    if ignored > 0 {
        tracing::warn!(ignored, "picker completed more than once; extra payloads dropped");
    }
    match &picked {
        Some(payload) => tracing::debug!(bytes = payload.len(), "picker delivered payload"),
        None => tracing::debug!("picker dismissed without a selection"),
    }
    picked
}

/// Picker that hands over a payload prepared ahead of time, then behaves as
/// if the user cancelled.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PreloadedPicker {
    queued: Option<Payload>,
}

impl PreloadedPicker {
    #[must_use]
    pub fn new(payload: Payload) -> Self {
        Self { queued: Some(payload) }
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self { queued: None }
    }
}

impl Picker for PreloadedPicker {
    fn pick(&mut self, on_picked: &mut dyn FnMut(Payload)) {
        if let Some(payload) = self.queued.take() {
            on_picked(payload);
        }
    }
}
