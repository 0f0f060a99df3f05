use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// A published note. `content` is always rendered HTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Which submit button was pressed on the note form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Publish,
    Upload,
    None,
}

impl Action {
    /// `publish=Publish` wins over `upload=Upload`; anything else is a no-op.
    pub fn from_fields(publish: Option<&str>, upload: Option<&str>) -> Self {
        if publish == Some("Publish") {
            Action::Publish
        } else if upload == Some("Upload") {
            Action::Upload
        } else {
            Action::None
        }
    }
}

/// File part of the note form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Parsed `POST /note` form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub description: String,
    pub image: Option<UploadedImage>,
    pub action: Action,
}

/// Everything the listing page needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingView {
    pub notes: Vec<Note>,
    pub draft: String,
}

/// Result of handling a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Go back to the listing with a fresh draft.
    Redirect,
    /// Render the listing in place, keeping the draft.
    Render(ListingView),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_takes_precedence() {
        assert_eq!(Action::from_fields(Some("Publish"), Some("Upload")), Action::Publish);
        assert_eq!(Action::from_fields(None, Some("Upload")), Action::Upload);
    }

    #[test]
    fn unexpected_values_are_ignored() {
        assert_eq!(Action::from_fields(Some("publish"), None), Action::None);
        assert_eq!(Action::from_fields(None, Some("")), Action::None);
        assert_eq!(Action::from_fields(None, None), Action::None);
    }
}
