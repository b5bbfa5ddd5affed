//! services/dashboard/src/stores/rubrics.rs
//!
//! Observable store over the teacher's grading rubrics. Create and update
//! run the draft through client-side validation first; an invalid draft is
//! rejected before the lifecycle starts, so shared state never flickers.

use grading_assistant_core::domain::{Rubric, RubricDraft};
use grading_assistant_core::ports::DocRouterService;
use std::sync::Arc;
use tokio::sync::watch;

use super::{StoreCore, StoreError, StoreState};

pub struct RubricStore {
    api: Arc<dyn DocRouterService>,
    core: StoreCore<Rubric>,
}

impl RubricStore {
    pub fn new(api: Arc<dyn DocRouterService>) -> Self {
        Self {
            api,
            core: StoreCore::new(),
        }
    }

    pub fn state(&self) -> StoreState<Rubric> {
        self.core.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState<Rubric>> {
        self.core.subscribe()
    }

    pub async fn fetch_all(&self) -> Result<Vec<Rubric>, StoreError> {
        self.core
            .run(
                "fetch_all",
                None,
                "Failed to load rubrics",
                async move { self.api.list_rubrics().await },
                |state, rubrics| {
                    state.items = rubrics.clone();
                },
            )
            .await
    }

    pub async fn fetch_one(&self, id: &str) -> Result<Rubric, StoreError> {
        self.core
            .run(
                "fetch_one",
                Some(id),
                "Failed to load rubric",
                async move { self.api.get_rubric(id).await },
                |state, rubric| {
                    state.current = Some(rubric.clone());
                },
            )
            .await
    }

    /// Creates a rubric and appends it to the list.
    pub async fn create(&self, draft: &RubricDraft) -> Result<Rubric, StoreError> {
        draft.validate().map_err(StoreError::Validation)?;
        self.core
            .run(
                "create",
                None,
                "Failed to create rubric",
                async move { self.api.create_rubric(draft).await },
                |state, rubric| {
                    state.items.push(rubric.clone());
                },
            )
            .await
    }

    /// Sends a full replacement for the rubric and swaps the matching list
    /// entry in place, preserving order.
    pub async fn update(&self, id: &str, draft: &RubricDraft) -> Result<Rubric, StoreError> {
        draft.validate().map_err(StoreError::Validation)?;
        self.core
            .run(
                "update",
                Some(id),
                "Failed to update rubric",
                async move { self.api.update_rubric(id, draft).await },
                |state, rubric| {
                    if let Some(slot) = state.items.iter_mut().find(|r| r.id == rubric.id) {
                        *slot = rubric.clone();
                    }
                    state.current = Some(rubric.clone());
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing::{stub_rubric, StubApi};
    use grading_assistant_core::domain::RubricValidationError;
    use grading_assistant_core::ports::PortError;

    fn draft() -> RubricDraft {
        RubricDraft {
            name: "Persuasive essay".to_string(),
            description: "Five paragraph persuasive essay".to_string(),
            prompt: "Grade the essay for thesis clarity, supporting evidence, organization, \
                     and mechanics. Cite specific passages."
                .to_string(),
        }
    }

    #[tokio::test]
    async fn an_invalid_draft_never_reaches_the_api() {
        let stub = Arc::new(StubApi::new());
        let store = RubricStore::new(stub.clone());

        let empty = RubricDraft {
            name: String::new(),
            description: String::new(),
            prompt: String::new(),
        };
        let err = store.create(&empty).await.unwrap_err();
        let StoreError::Validation(problems) = err else {
            panic!("expected a validation failure");
        };
        assert!(problems.contains(&RubricValidationError::NameRequired));

        assert_eq!(stub.create_rubric.calls(), 0);
        let state = store.state();
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn create_appends_to_the_list() {
        let stub = Arc::new(StubApi::new());
        let store = RubricStore::new(stub.clone());

        stub.list_rubrics
            .reply(Ok(vec![stub_rubric("rub-1", "Essay")]));
        store.fetch_all().await.unwrap();

        stub.create_rubric.reply(Ok(stub_rubric("rub-2", "Lab report")));
        store.create(&draft()).await.unwrap();

        let names: Vec<_> = store.state().items.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, ["Essay", "Lab report"]);
    }

    #[tokio::test]
    async fn update_replaces_the_matching_entry_in_place() {
        let stub = Arc::new(StubApi::new());
        let store = RubricStore::new(stub.clone());

        stub.list_rubrics.reply(Ok(vec![
            stub_rubric("rub-1", "Essay"),
            stub_rubric("rub-2", "Lab report"),
            stub_rubric("rub-3", "Book review"),
        ]));
        store.fetch_all().await.unwrap();

        stub.update_rubric
            .reply(Ok(stub_rubric("rub-2", "Lab report v2")));
        store.update("rub-2", &draft()).await.unwrap();

        let state = store.state();
        let ids: Vec<_> = state.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["rub-1", "rub-2", "rub-3"]);
        assert_eq!(state.items[1].name, "Lab report v2");
        assert_eq!(
            state.current.as_ref().map(|r| r.name.as_str()),
            Some("Lab report v2")
        );
    }

    #[tokio::test]
    async fn fetch_one_only_touches_current() {
        let stub = Arc::new(StubApi::new());
        let store = RubricStore::new(stub.clone());

        stub.get_rubric.reply(Ok(stub_rubric("rub-7", "Poetry")));
        store.fetch_one("rub-7").await.unwrap();

        let state = store.state();
        assert_eq!(state.current.as_ref().map(|r| r.id.as_str()), Some("rub-7"));
        assert!(state.items.is_empty());
    }

    #[tokio::test]
    async fn a_failed_listing_is_reported_and_resurfaced() {
        let stub = Arc::new(StubApi::new());
        let store = RubricStore::new(stub.clone());

        stub.list_rubrics.reply(Err(PortError::Protocol {
            status: 401,
            message: "Unauthorized".to_string(),
        }));
        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Api(PortError::Protocol { status: 401, .. })
        ));
        assert_eq!(
            store.state().error.as_deref(),
            Some("Failed to load rubrics")
        );
    }
}
