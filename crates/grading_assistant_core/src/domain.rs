//! crates/grading_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Minimum number of characters a rubric prompt must contain before it is
/// worth submitting to the grading service.
pub const MIN_PROMPT_CHARS: usize = 50;

/// Error returned when the wire carries a status string this client does not
/// recognize.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status value: {0:?}")]
pub struct UnknownStatus(pub String);

/// Processing state of an uploaded document. Transitions are owned by the
/// remote service; the client only observes them via re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl FromStr for DocumentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// A student document uploaded for grading. Immutable once fetched except
/// for whole-record replacement on re-fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: DocumentStatus,
    pub content_type: String,
    pub size: u64,
}

/// One page of an organization's documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentPage {
    pub documents: Vec<Document>,
}

/// A named prompt template plus metadata describing how the AI grading
/// service should evaluate a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Rubric {
    pub id: String,
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The teacher-authored fields of a rubric, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RubricDraft {
    pub name: String,
    pub description: String,
    pub prompt: String,
}

/// A single client-side validation failure for a rubric draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RubricValidationError {
    #[error("Rubric name is required")]
    NameRequired,
    #[error("Description is required")]
    DescriptionRequired,
    #[error("Prompt template is required")]
    PromptRequired,
    #[error("Prompt should be more detailed (at least {} characters)", MIN_PROMPT_CHARS)]
    PromptTooShort,
}

impl RubricDraft {
    /// Pre-submission form validation. The server remains the authority on
    /// what it accepts; this check only rejects drafts that are certainly
    /// not worth a request.
    pub fn validate(&self) -> Result<(), Vec<RubricValidationError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(RubricValidationError::NameRequired);
        }
        if self.description.trim().is_empty() {
            errors.push(RubricValidationError::DescriptionRequired);
        }
        if self.prompt.trim().is_empty() {
            errors.push(RubricValidationError::PromptRequired);
        } else if self.prompt.chars().count() < MIN_PROMPT_CHARS {
            errors.push(RubricValidationError::PromptTooShort);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Lifecycle state of one grading run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingStatus {
    Pending,
    Completed,
    Failed,
}

impl FromStr for GradingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for GradingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// The outcome of applying one rubric to one document: AI-produced feedback
/// with an optional teacher overlay.
///
/// The AI fields are read-only source data; the teacher-authored fields
/// augment them and never overwrite them.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingResult {
    pub id: String,
    pub document_id: String,
    /// The rubric reference, spelled the way the remote API spells it.
    pub schema_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: GradingStatus,
    /// Opaque AI feedback payload; its structure belongs to the service.
    pub ai_feedback: Value,
    pub teacher_feedback: Option<String>,
    pub score: Option<f64>,
}

/// A teacher's review overlay for a grading result.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingReview {
    pub teacher_feedback: String,
    pub score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, description: &str, prompt: &str) -> RubricDraft {
        RubricDraft {
            name: name.to_string(),
            description: description.to_string(),
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        let d = draft(
            "Biology Lab Report Rubric",
            "Evaluates lab reports",
            "Grade the report on hypothesis clarity, methodology, and data analysis quality.",
        );
        assert!(d.validate().is_ok());
    }

    #[test]
    fn blank_fields_are_each_reported() {
        let errors = draft(" ", "", "").validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                RubricValidationError::NameRequired,
                RubricValidationError::DescriptionRequired,
                RubricValidationError::PromptRequired,
            ]
        );
    }

    #[test]
    fn short_prompt_is_rejected() {
        let errors = draft("Essay", "Short essays", "Grade the essay.")
            .validate()
            .unwrap_err();
        assert_eq!(errors, vec![RubricValidationError::PromptTooShort]);
    }

    #[test]
    fn prompt_length_counts_characters_not_bytes() {
        // 50 multi-byte characters must satisfy the minimum.
        let d = draft("Rubrik", "Beschreibung", &"ä".repeat(MIN_PROMPT_CHARS));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn statuses_round_trip_through_their_wire_strings() {
        for s in ["pending", "processing", "completed", "failed"] {
            assert_eq!(s.parse::<DocumentStatus>().unwrap().to_string(), s);
        }
        for s in ["pending", "completed", "failed"] {
            assert_eq!(s.parse::<GradingStatus>().unwrap().to_string(), s);
        }
        assert!("archived".parse::<DocumentStatus>().is_err());
        assert!("processing".parse::<GradingStatus>().is_err());
    }
}
