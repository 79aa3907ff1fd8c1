//! Completion evidence attached to a task under review.

use super::{ParseMediaKindError, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media item submitted as evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// A still image.
    Photo,
    /// A video clip.
    Video,
    /// Any other file.
    Document,
}

impl MediaKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MediaKind {
    type Error = ParseMediaKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "photo" => Ok(Self::Photo),
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            _ => Err(ParseMediaKindError(value.to_owned())),
        }
    }
}

/// Opaque transport-side reference to an uploaded media item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    /// Creates a validated media reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyMediaReference`] when the trimmed value
    /// is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyMediaReference);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reference as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Proof of completion submitted by the assignee.
///
/// A task holds at most one piece of evidence; a later submission replaces
/// the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Evidence {
    /// Free-form proof text.
    Text {
        /// Trimmed, non-empty proof text.
        proof: String,
    },
    /// Reference to an uploaded media item.
    Media {
        /// Transport-side media reference.
        reference: MediaRef,
        /// Kind of the uploaded media.
        kind: MediaKind,
    },
}

impl Evidence {
    /// Creates text evidence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyEvidence`] when the trimmed text is
    /// empty.
    pub fn text(proof: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = proof.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyEvidence);
        }
        Ok(Self::Text {
            proof: trimmed.to_owned(),
        })
    }

    /// Creates media evidence.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyMediaReference`] when the reference is
    /// empty.
    pub fn media(kind: MediaKind, reference: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self::Media {
            reference: MediaRef::new(reference)?,
            kind,
        })
    }

    /// Returns the proof text for text evidence.
    #[must_use]
    pub fn proof_text(&self) -> Option<&str> {
        match self {
            Self::Text { proof } => Some(proof),
            Self::Media { .. } => None,
        }
    }

    /// Returns the media reference and kind for media evidence.
    #[must_use]
    pub const fn media_item(&self) -> Option<(&MediaRef, MediaKind)> {
        match self {
            Self::Text { .. } => None,
            Self::Media { reference, kind } => Some((reference, *kind)),
        }
    }
}
