//! Word-level diff of modified text values.
//!
//! Uses the `similar` crate (Myers diff algorithm) over word tokens and
//! merges consecutive tokens with the same tag into one segment.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// A run of text that is shared, inserted or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "text", rename_all = "camelCase")]
pub enum TextSegment {
    Equal(String),
    /// Present only in the comparison.
    Inserted(String),
    /// Present only in the base.
    Deleted(String),
}

impl TextSegment {
    fn tag(&self) -> ChangeTag {
        match self {
            Self::Equal(_) => ChangeTag::Equal,
            Self::Inserted(_) => ChangeTag::Insert,
            Self::Deleted(_) => ChangeTag::Delete,
        }
    }

    fn push_str(&mut self, text: &str) {
        match self {
            Self::Equal(s) | Self::Inserted(s) | Self::Deleted(s) => s.push_str(text),
        }
    }
}

/// The result of diffing two strings word by word.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WordDiff {
    pub segments: Vec<TextSegment>,
}

impl WordDiff {
    /// Returns `true` if the two strings are identical.
    pub fn is_empty(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, TextSegment::Equal(_)))
    }

    pub fn insertions(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, TextSegment::Inserted(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, TextSegment::Deleted(_)))
            .count()
    }
}

/// Compute a word-level diff between two strings.
pub fn diff_words(old: &str, new: &str) -> WordDiff {
    if old == new {
        let segments = if old.is_empty() {
            Vec::new()
        } else {
            vec![TextSegment::Equal(old.to_string())]
        };
        return WordDiff { segments };
    }

    let text_diff = TextDiff::from_words(old, new);
    let mut segments: Vec<TextSegment> = Vec::new();

    for change in text_diff.iter_all_changes() {
        let tag = change.tag();
        let value = change.value();
        match segments.last_mut() {
            Some(last) if last.tag() == tag => last.push_str(value),
            _ => segments.push(match tag {
                ChangeTag::Equal => TextSegment::Equal(value.to_string()),
                ChangeTag::Insert => TextSegment::Inserted(value.to_string()),
                ChangeTag::Delete => TextSegment::Deleted(value.to_string()),
            }),
        }
    }

    WordDiff { segments }
}
