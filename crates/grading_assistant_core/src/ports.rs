//! crates/grading_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like HTTP APIs.

use async_trait::async_trait;
use bytes::Bytes;
use crate::domain::{Document, DocumentPage, GradingResult, GradingReview, Rubric, RubricDraft};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations, classifying failures the
/// way callers need to react to them.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A required configuration value was missing; no network attempt was made.
    #[error("configuration error: {0}")]
    Config(String),
    /// The request never produced an HTTP response (DNS, connect, read).
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("api error (status {status}): {message}")]
    Protocol { status: u16, message: String },
    /// A success response whose body did not match the expected contract.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The DocRouter grading API, one method per remote resource-action pair.
///
/// Implementations make exactly one attempt per invocation: no retry, no
/// client-side timeout, no backoff. Credentials are resolved at call time so
/// that a settings change takes effect on the very next request.
#[async_trait]
pub trait DocRouterService: Send + Sync {
    // --- Documents ---
    async fn upload_document(
        &self,
        file_name: &str,
        content_type: &str,
        content: Bytes,
    ) -> PortResult<Document>;

    async fn list_documents(
        &self,
        organization_id: &str,
        skip: usize,
        limit: usize,
    ) -> PortResult<DocumentPage>;

    async fn get_document(&self, id: &str) -> PortResult<Document>;

    // --- Rubrics ---
    async fn create_rubric(&self, draft: &RubricDraft) -> PortResult<Rubric>;

    async fn list_rubrics(&self) -> PortResult<Vec<Rubric>>;

    async fn get_rubric(&self, id: &str) -> PortResult<Rubric>;

    async fn update_rubric(&self, id: &str, draft: &RubricDraft) -> PortResult<Rubric>;

    // --- Grading ---
    async fn grade_document(&self, document_id: &str, rubric_id: &str)
        -> PortResult<GradingResult>;

    async fn get_grading_result(&self, id: &str) -> PortResult<GradingResult>;

    async fn update_grading_result(
        &self,
        id: &str,
        review: &GradingReview,
    ) -> PortResult<GradingResult>;
}
