use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::core::clipboard::classifier::classify;

/// Identifier of a history entry. Assigned once, never reused.
pub type EntryId = Uuid;

/// Maximum characters shown in a one-line preview
const PREVIEW_CHARS: usize = 100;

/// Type of clipboard content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Url,
    Code,
    /// Reserved. The classifier never produces it.
    Image,
}

impl ContentKind {
    /// Human readable label for list headers and sidebars
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Text => "Text",
            ContentKind::Url => "Link",
            ContentKind::Code => "Code",
            ContentKind::Image => "Image",
        }
    }
}

/// A single clipboard history entry.
///
/// Fields are read-only after construction. Two entries are equal only when
/// their ids are equal, regardless of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardEntry {
    id: EntryId,
    content: String,
    #[serde(rename = "type")]
    kind: ContentKind,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_hint: Option<String>,
    length: usize,
}

impl ClipboardEntry {
    /// Create a new entry from copied text, classifying it and stamping it with
    /// a fresh id and the current time.
    pub fn new(content: String, source_hint: Option<String>) -> Self {
        let kind = classify(&content);
        let length = content.graphemes(true).count();

        Self {
            id: Uuid::new_v4(),
            content,
            kind,
            created_at: Utc::now(),
            source_hint,
            length,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Application presumed to have produced the copy. Advisory only.
    pub fn source_hint(&self) -> Option<&str> {
        self.source_hint.as_deref()
    }

    /// Character (grapheme) count of the content, fixed at creation
    pub fn length(&self) -> usize {
        self.length
    }

    /// Single-line preview: trimmed, first line only, truncated to 100 characters
    pub fn preview(&self) -> String {
        let first_line = self.content.trim().lines().next().unwrap_or_default();
        let mut graphemes = first_line.graphemes(true);
        let head: String = graphemes.by_ref().take(PREVIEW_CHARS).collect();

        if graphemes.next().is_some() || self.content.trim().lines().nth(1).is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

impl PartialEq for ClipboardEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClipboardEntry {}

impl Hash for ClipboardEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
