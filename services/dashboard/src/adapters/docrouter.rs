//! services/dashboard/src/adapters/docrouter.rs
//!
//! This module contains the DocRouter adapter, which is the concrete
//! implementation of the `DocRouterService` port from the `core` crate. It
//! handles all HTTP traffic to the DocRouter REST API using `reqwest`.
//!
//! Credentials (base URL and bearer token) are re-read from the shared
//! `SettingsStore` on every call, so a saved settings change takes effect on
//! the very next request. Each invocation is a single attempt: no retries,
//! no client-side timeout.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use grading_assistant_core::domain::{
    Document, DocumentPage, GradingResult, GradingReview, Rubric, RubricDraft, UnknownStatus,
};
use grading_assistant_core::ports::{DocRouterService, PortError, PortResult};
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::SettingsStore;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A DocRouter API adapter that implements the `DocRouterService` port.
#[derive(Clone)]
pub struct DocRouterClient {
    http: reqwest::Client,
    settings: Arc<SettingsStore>,
}

impl DocRouterClient {
    /// Creates a new `DocRouterClient` over a shared settings store.
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Builds the full URL for an API path from the currently resolved base
    /// URL. Fails before any network activity when no base URL resolves.
    fn endpoint(&self, path: &str) -> PortResult<String> {
        let base = self.settings.api_base_url();
        if base.is_empty() {
            return Err(PortError::Config(
                "API base URL is not configured".to_string(),
            ));
        }
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }

    /// Attaches `Authorization: Bearer <token>` when a token is currently
    /// resolved. Without one the request still goes out unauthenticated and
    /// the server decides.
    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.settings.api_token();
        if token.is_empty() {
            builder
        } else {
            builder.header("Authorization", format!("Bearer {}", token))
        }
    }
}

//=========================================================================================
// Response Handling
//=========================================================================================

/// Reads a response along the error taxonomy: a non-2xx status becomes a
/// protocol error carrying the server's message, a 2xx body that fails
/// strict decoding becomes a shape error, and a failure while reading the
/// body is a transport error.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> PortResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PortError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(PortError::Protocol {
            status: status.as_u16(),
            message: protocol_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| PortError::Decode(e.to_string()))
}

/// Extracts the human-readable message from an error body. The DocRouter
/// API reports failures FastAPI-style as `{"detail": ...}`; anything else
/// is passed through as-is.
fn protocol_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail") {
            return match detail {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
        }
    }
    body.trim().to_string()
}

//=========================================================================================
// Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct DocumentRecord {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    status: String,
    content_type: String,
    size: u64,
}
impl DocumentRecord {
    fn to_domain(self) -> PortResult<Document> {
        let status = self
            .status
            .parse()
            .map_err(|e: UnknownStatus| PortError::Decode(e.to_string()))?;
        Ok(Document {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
            status,
            content_type: self.content_type,
            size: self.size,
        })
    }
}

/// The org-scoped document list envelope. Decoding is strict: a 2xx body
/// without a `documents` array is a shape error, which is what the
/// connection verifier leans on.
#[derive(Deserialize)]
struct DocumentPageRecord {
    documents: Vec<DocumentRecord>,
}
impl DocumentPageRecord {
    fn to_domain(self) -> PortResult<DocumentPage> {
        let documents = self
            .documents
            .into_iter()
            .map(DocumentRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        Ok(DocumentPage { documents })
    }
}

#[derive(Deserialize)]
struct RubricRecord {
    id: String,
    name: String,
    description: String,
    prompt: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl RubricRecord {
    fn to_domain(self) -> Rubric {
        Rubric {
            id: self.id,
            name: self.name,
            description: self.description,
            prompt: self.prompt,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Deserialize)]
struct GradingResultRecord {
    id: String,
    document_id: String,
    schema_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    status: String,
    ai_feedback: serde_json::Value,
    teacher_feedback: Option<String>,
    score: Option<f64>,
}
impl GradingResultRecord {
    fn to_domain(self) -> PortResult<GradingResult> {
        let status = self
            .status
            .parse()
            .map_err(|e: UnknownStatus| PortError::Decode(e.to_string()))?;
        Ok(GradingResult {
            id: self.id,
            document_id: self.document_id,
            schema_id: self.schema_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            status,
            ai_feedback: self.ai_feedback,
            teacher_feedback: self.teacher_feedback,
            score: self.score,
        })
    }
}

//=========================================================================================
// Request Payload Structs
//=========================================================================================

#[derive(Serialize)]
struct RubricPayload<'a> {
    name: &'a str,
    description: &'a str,
    prompt: &'a str,
}
impl<'a> RubricPayload<'a> {
    fn from_draft(draft: &'a RubricDraft) -> Self {
        Self {
            name: &draft.name,
            description: &draft.description,
            prompt: &draft.prompt,
        }
    }
}

/// The grading submission body. The wire field stays `schema_id` because
/// that is what the remote contract calls a rubric.
#[derive(Serialize)]
struct GradeRequest<'a> {
    document_id: &'a str,
    schema_id: &'a str,
}

#[derive(Serialize)]
struct ReviewPayload<'a> {
    teacher_feedback: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
}

//=========================================================================================
// `DocRouterService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocRouterService for DocRouterClient {
    async fn upload_document(
        &self,
        file_name: &str,
        content_type: &str,
        content: Bytes,
    ) -> PortResult<Document> {
        let url = self.endpoint("documents")?;
        let part = multipart::Part::stream(content)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| {
                PortError::Config(format!("Invalid content type '{}': {}", content_type, e))
            })?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .authorized(self.http.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: DocumentRecord = decode(response).await?;
        record.to_domain()
    }

    async fn list_documents(
        &self,
        organization_id: &str,
        skip: usize,
        limit: usize,
    ) -> PortResult<DocumentPage> {
        if organization_id.is_empty() {
            return Err(PortError::Config(
                "Organization ID is not configured".to_string(),
            ));
        }
        let url = self.endpoint(&format!("v0/orgs/{}/documents", organization_id))?;

        let response = self
            .authorized(self.http.get(&url))
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: DocumentPageRecord = decode(response).await?;
        record.to_domain()
    }

    async fn get_document(&self, id: &str) -> PortResult<Document> {
        let url = self.endpoint(&format!("documents/{}", id))?;

        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: DocumentRecord = decode(response).await?;
        record.to_domain()
    }

    async fn create_rubric(&self, draft: &RubricDraft) -> PortResult<Rubric> {
        let url = self.endpoint("rubrics")?;

        let response = self
            .authorized(self.http.post(&url))
            .json(&RubricPayload::from_draft(draft))
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: RubricRecord = decode(response).await?;
        Ok(record.to_domain())
    }

    async fn list_rubrics(&self) -> PortResult<Vec<Rubric>> {
        let url = self.endpoint("rubrics")?;

        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        // The rubric list endpoint returns a bare JSON array.
        let records: Vec<RubricRecord> = decode(response).await?;
        Ok(records.into_iter().map(RubricRecord::to_domain).collect())
    }

    async fn get_rubric(&self, id: &str) -> PortResult<Rubric> {
        let url = self.endpoint(&format!("rubrics/{}", id))?;

        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: RubricRecord = decode(response).await?;
        Ok(record.to_domain())
    }

    async fn update_rubric(&self, id: &str, draft: &RubricDraft) -> PortResult<Rubric> {
        let url = self.endpoint(&format!("rubrics/{}", id))?;

        let response = self
            .authorized(self.http.put(&url))
            .json(&RubricPayload::from_draft(draft))
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: RubricRecord = decode(response).await?;
        Ok(record.to_domain())
    }

    async fn grade_document(&self, document_id: &str, rubric_id: &str) -> PortResult<GradingResult> {
        let url = self.endpoint("grading")?;

        let response = self
            .authorized(self.http.post(&url))
            .json(&GradeRequest {
                document_id,
                schema_id: rubric_id,
            })
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: GradingResultRecord = decode(response).await?;
        record.to_domain()
    }

    async fn get_grading_result(&self, id: &str) -> PortResult<GradingResult> {
        let url = self.endpoint(&format!("grading/{}", id))?;

        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: GradingResultRecord = decode(response).await?;
        record.to_domain()
    }

    async fn update_grading_result(
        &self,
        id: &str,
        review: &GradingReview,
    ) -> PortResult<GradingResult> {
        let url = self.endpoint(&format!("grading/{}", id))?;

        let response = self
            .authorized(self.http.put(&url))
            .json(&ReviewPayload {
                teacher_feedback: &review.teacher_feedback,
                score: review.score,
            })
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let record: GradingResultRecord = decode(response).await?;
        record.to_domain()
    }
}
