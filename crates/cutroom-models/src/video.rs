//! Video models and review status transitions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, VideoId};

/// Opaque reference to a stored draft blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobLocator(pub String);

impl BlobLocator {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status of a submitted video.
///
/// Legal transitions: `pending -> approved`, `pending -> rejected`,
/// `approved -> uploaded`. `rejected` and `uploaded` are terminal.
/// `approved` is transient; it persists only while publication to the
/// hosting platform has not succeeded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Waiting for the creator's decision
    #[default]
    Pending,
    /// Approved by the creator, not yet on the hosting platform
    Approved,
    /// Rejected by the creator
    Rejected,
    /// Live on the hosting platform
    Uploaded,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Uploaded => "uploaded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReviewStatus::Pending),
            "approved" => Some(ReviewStatus::Approved),
            "rejected" => Some(ReviewStatus::Rejected),
            "uploaded" => Some(ReviewStatus::Uploaded),
            _ => None,
        }
    }

    /// Check if this is a terminal state (no further transition).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewStatus::Rejected | ReviewStatus::Uploaded)
    }

    /// Whether `next` is a legal successor of this status.
    pub fn can_transition_to(&self, next: ReviewStatus) -> bool {
        matches!(
            (self, next),
            (ReviewStatus::Pending, ReviewStatus::Approved)
                | (ReviewStatus::Pending, ReviewStatus::Rejected)
                | (ReviewStatus::Approved, ReviewStatus::Uploaded)
        )
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A video record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    /// Unique video ID
    pub id: VideoId,

    /// Title supplied at submission (never empty)
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Reference to the draft blob in storage
    pub blob_locator: BlobLocator,

    /// Creator who owns approval authority
    pub creator_id: AccountId,

    /// Editor who uploaded the draft (absent for creator self-uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<AccountId>,

    /// Review status
    #[serde(default)]
    pub status: ReviewStatus,

    /// Hosting platform ID. Set if and only if status is `uploaded`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// When the creator approved or rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,

    /// When publication to the hosting platform succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Create a new video record in `pending`. The ID is passed in because
    /// the blob locator is derived from it before the record exists.
    pub fn new(
        id: VideoId,
        title: impl Into<String>,
        description: impl Into<String>,
        blob_locator: BlobLocator,
        creator_id: AccountId,
        editor_id: Option<AccountId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: description.into(),
            blob_locator,
            creator_id,
            editor_id,
            status: ReviewStatus::Pending,
            external_id: None,
            created_at: now,
            updated_at: now,
            reviewed_at: None,
            published_at: None,
        }
    }

    /// Record the creator's approval.
    pub fn approve(&mut self) {
        self.status = ReviewStatus::Approved;
        self.reviewed_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Record the creator's rejection.
    pub fn reject(&mut self) {
        self.status = ReviewStatus::Rejected;
        self.reviewed_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Record successful publication.
    pub fn mark_uploaded(&mut self, external_id: impl Into<String>) {
        self.status = ReviewStatus::Uploaded;
        self.external_id = Some(external_id.into());
        self.published_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> Video {
        Video::new(
            VideoId::new(),
            "Draft 1",
            "first cut",
            BlobLocator::from_string("drafts/c1/v1/source.mp4"),
            AccountId::new(),
            Some(AccountId::new()),
        )
    }

    #[test]
    fn test_new_video_is_pending() {
        let video = sample_video();
        assert_eq!(video.status, ReviewStatus::Pending);
        assert!(video.external_id.is_none());
        assert!(video.reviewed_at.is_none());
    }

    #[test]
    fn test_transition_table() {
        use ReviewStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Uploaded));

        // No path back to pending, no skipping approval
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Uploaded));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Uploaded.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn test_terminal_states() {
        assert!(ReviewStatus::Rejected.is_terminal());
        assert!(ReviewStatus::Uploaded.is_terminal());
        assert!(!ReviewStatus::Pending.is_terminal());
        assert!(!ReviewStatus::Approved.is_terminal());
    }

    #[test]
    fn test_mark_uploaded_sets_external_id() {
        let mut video = sample_video();
        video.approve();
        assert_eq!(video.status, ReviewStatus::Approved);
        assert!(video.external_id.is_none());

        video.mark_uploaded("yt123");
        assert_eq!(video.status, ReviewStatus::Uploaded);
        assert_eq!(video.external_id.as_deref(), Some("yt123"));
        assert!(video.published_at.is_some());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ReviewStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert_eq!(ReviewStatus::parse("uploaded"), Some(ReviewStatus::Uploaded));
        assert_eq!(ReviewStatus::parse("archived"), None);
    }
}
