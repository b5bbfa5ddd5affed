//! services/dashboard/src/stores/grading.rs
//!
//! Observable store over grading runs and their teacher reviews. Every
//! action upserts the returned result by id and makes it `current`, since
//! the grading surfaces always focus on the result they just touched.

use grading_assistant_core::domain::{GradingResult, GradingReview};
use grading_assistant_core::ports::DocRouterService;
use std::sync::Arc;
use tokio::sync::watch;

use super::{StoreCore, StoreError, StoreState};

pub struct GradingStore {
    api: Arc<dyn DocRouterService>,
    core: StoreCore<GradingResult>,
}

impl GradingStore {
    pub fn new(api: Arc<dyn DocRouterService>) -> Self {
        Self {
            api,
            core: StoreCore::new(),
        }
    }

    pub fn state(&self) -> StoreState<GradingResult> {
        self.core.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState<GradingResult>> {
        self.core.subscribe()
    }

    /// Submits a document for grading against a rubric.
    pub async fn grade(
        &self,
        document_id: &str,
        rubric_id: &str,
    ) -> Result<GradingResult, StoreError> {
        self.core
            .run(
                "grade",
                Some(document_id),
                "Failed to grade document",
                async move { self.api.grade_document(document_id, rubric_id).await },
                |state, result| {
                    upsert(&mut state.items, result);
                    state.current = Some(result.clone());
                },
            )
            .await
    }

    pub async fn fetch_one(&self, id: &str) -> Result<GradingResult, StoreError> {
        self.core
            .run(
                "fetch_one",
                Some(id),
                "Failed to load grading result",
                async move { self.api.get_grading_result(id).await },
                |state, result| {
                    upsert(&mut state.items, result);
                    state.current = Some(result.clone());
                },
            )
            .await
    }

    /// Records the teacher's feedback overlay on an AI-produced result.
    pub async fn review(
        &self,
        id: &str,
        teacher_feedback: &str,
        score: Option<f64>,
    ) -> Result<GradingResult, StoreError> {
        let review = GradingReview {
            teacher_feedback: teacher_feedback.to_string(),
            score,
        };
        self.core
            .run(
                "review",
                Some(id),
                "Failed to update feedback",
                async move { self.api.update_grading_result(id, &review).await },
                |state, result| {
                    upsert(&mut state.items, result);
                    state.current = Some(result.clone());
                },
            )
            .await
    }
}

fn upsert(items: &mut Vec<GradingResult>, result: &GradingResult) {
    match items.iter_mut().find(|r| r.id == result.id) {
        Some(slot) => *slot = result.clone(),
        None => items.push(result.clone()),
    }
}
