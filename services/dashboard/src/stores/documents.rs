//! services/dashboard/src/stores/documents.rs
//!
//! Observable store over the organization's uploaded documents.

use bytes::Bytes;
use grading_assistant_core::domain::{Document, DocumentPage};
use grading_assistant_core::ports::DocRouterService;
use std::sync::Arc;
use tokio::sync::watch;

use super::{StoreCore, StoreError, StoreState};
use crate::config::SettingsStore;

/// Page size for a full refresh of the documents list.
const DEFAULT_PAGE_LIMIT: usize = 100;

pub struct DocumentStore {
    api: Arc<dyn DocRouterService>,
    settings: Arc<SettingsStore>,
    core: StoreCore<Document>,
}

impl DocumentStore {
    pub fn new(api: Arc<dyn DocRouterService>, settings: Arc<SettingsStore>) -> Self {
        Self {
            api,
            settings,
            core: StoreCore::new(),
        }
    }

    pub fn state(&self) -> StoreState<Document> {
        self.core.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState<Document>> {
        self.core.subscribe()
    }

    /// Replaces the list with a fresh page for the configured organization.
    /// A failed refresh leaves the previous items in place.
    pub async fn fetch_all(&self) -> Result<DocumentPage, StoreError> {
        let organization_id = self.settings.organization_id();
        self.core
            .run(
                "fetch_all",
                None,
                "Failed to load documents",
                async move {
                    self.api
                        .list_documents(&organization_id, 0, DEFAULT_PAGE_LIMIT)
                        .await
                },
                |state, page| {
                    state.items = page.documents.clone();
                },
            )
            .await
    }

    /// Uploads one file and appends the returned document to the list.
    /// Distinct file names upload independently; re-uploading the same name
    /// supersedes the still-running attempt.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        content: Bytes,
    ) -> Result<Document, StoreError> {
        self.core
            .run(
                "upload",
                Some(file_name),
                "Failed to upload document",
                async move {
                    self.api
                        .upload_document(file_name, content_type, content)
                        .await
                },
                |state, document| {
                    state.items.push(document.clone());
                },
            )
            .await
    }

    /// Fetches one document, making it `current` and upserting it into the
    /// list.
    pub async fn fetch_one(&self, id: &str) -> Result<Document, StoreError> {
        self.core
            .run(
                "fetch_one",
                Some(id),
                "Failed to load document",
                async move { self.api.get_document(id).await },
                |state, document| {
                    upsert(&mut state.items, document);
                    state.current = Some(document.clone());
                },
            )
            .await
    }
}

fn upsert(items: &mut Vec<Document>, document: &Document) {
    match items.iter_mut().find(|d| d.id == document.id) {
        Some(slot) => *slot = document.clone(),
        None => items.push(document.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialDefaults;
    use crate::stores::testing::{page_of, stub_document, StubApi};
    use grading_assistant_core::ports::PortError;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> Arc<SettingsStore> {
        let defaults = CredentialDefaults {
            organization_id: "org-1".to_string(),
            ..CredentialDefaults::default()
        };
        Arc::new(SettingsStore::open(dir.path().join("credentials.json"), defaults).unwrap())
    }

    fn ids(items: &[Document]) -> Vec<&str> {
        items.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn a_failed_refresh_keeps_the_previous_list() {
        let dir = TempDir::new().unwrap();
        let stub = Arc::new(StubApi::new());
        let store = DocumentStore::new(stub.clone(), settings(&dir));

        stub.list_documents
            .reply(Ok(page_of(vec![stub_document("doc-1")])));
        store.fetch_all().await.unwrap();
        assert_eq!(ids(&store.state().items), ["doc-1"]);

        stub.list_documents.reply(Err(PortError::Protocol {
            status: 500,
            message: "upstream exploded".to_string(),
        }));
        let err = store.fetch_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Api(_)));

        let state = store.state();
        assert_eq!(ids(&state.items), ["doc-1"]);
        assert_eq!(state.error.as_deref(), Some("Failed to load documents"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn a_later_refresh_clears_the_error_and_replaces_wholesale() {
        let dir = TempDir::new().unwrap();
        let stub = Arc::new(StubApi::new());
        let store = DocumentStore::new(stub.clone(), settings(&dir));

        stub.list_documents.reply(Err(PortError::Transport(
            "connection refused".to_string(),
        )));
        let _ = store.fetch_all().await;
        assert!(store.state().error.is_some());

        stub.list_documents.reply(Ok(page_of(vec![
            stub_document("doc-2"),
            stub_document("doc-3"),
        ])));
        store.fetch_all().await.unwrap();

        let state = store.state();
        assert_eq!(ids(&state.items), ["doc-2", "doc-3"]);
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn refresh_requests_the_default_page_for_the_configured_org() {
        let dir = TempDir::new().unwrap();
        let stub = Arc::new(StubApi::new());
        let store = DocumentStore::new(stub.clone(), settings(&dir));

        stub.list_documents.reply(Ok(page_of(vec![])));
        store.fetch_all().await.unwrap();

        let pages = stub.pages_requested.lock().unwrap();
        assert_eq!(*pages, vec![("org-1".to_string(), 0, 100)]);
    }

    #[tokio::test]
    async fn upload_appends_to_the_list() {
        let dir = TempDir::new().unwrap();
        let stub = Arc::new(StubApi::new());
        let store = DocumentStore::new(stub.clone(), settings(&dir));

        stub.list_documents
            .reply(Ok(page_of(vec![stub_document("doc-1")])));
        store.fetch_all().await.unwrap();

        stub.upload_document.reply(Ok(stub_document("doc-2")));
        store
            .upload("essay.pdf", "application/pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();

        assert_eq!(ids(&store.state().items), ["doc-1", "doc-2"]);
    }

    #[tokio::test]
    async fn fetch_one_sets_current_and_upserts() {
        let dir = TempDir::new().unwrap();
        let stub = Arc::new(StubApi::new());
        let store = DocumentStore::new(stub.clone(), settings(&dir));

        stub.get_document.reply(Ok(stub_document("doc-9")));
        store.fetch_one("doc-9").await.unwrap();

        let state = store.state();
        assert_eq!(state.current.as_ref().map(|d| d.id.as_str()), Some("doc-9"));
        assert_eq!(ids(&state.items), ["doc-9"]);
    }

    #[tokio::test]
    async fn subscribers_observe_the_replaced_snapshot() {
        let dir = TempDir::new().unwrap();
        let stub = Arc::new(StubApi::new());
        let store = DocumentStore::new(stub.clone(), settings(&dir));
        let mut rx = store.subscribe();

        stub.list_documents
            .reply(Ok(page_of(vec![stub_document("doc-1")])));
        store.fetch_all().await.unwrap();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(ids(&snapshot.items), ["doc-1"]);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn a_newer_refresh_supersedes_a_stalled_one() {
        let dir = TempDir::new().unwrap();
        let stub = Arc::new(StubApi::new());
        let store = Arc::new(DocumentStore::new(stub.clone(), settings(&dir)));

        stub.list_documents.hang();
        stub.list_documents
            .reply(Ok(page_of(vec![stub_document("doc-2")])));

        let stalled = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_all().await }
        });
        stub.entered.notified().await;

        store.fetch_all().await.unwrap();

        let err = stalled.await.unwrap().unwrap_err();
        assert!(matches!(err, StoreError::Superseded));

        let state = store.state();
        assert_eq!(ids(&state.items), ["doc-2"]);
        assert!(!state.loading);
        assert!(state.error.is_none());
    }
}
