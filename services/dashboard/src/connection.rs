//! services/dashboard/src/connection.rs
//!
//! The connection check behind the settings surface's "test" action.

use grading_assistant_core::ports::DocRouterService;
use tracing::warn;

/// Page size for the probe read. Small on purpose; the probe only has to
/// prove the credentials can reach the documents list.
const CONNECTION_PROBE_LIMIT: usize = 10;

/// Checks whether the configured credentials can reach the DocRouter API.
///
/// Runs one bounded read of the organization's documents. Every kind of
/// failure (missing configuration, transport trouble, an error status, a
/// 2xx body of the wrong shape) collapses to `false`; the detail is only
/// logged.
pub async fn test_connection(api: &dyn DocRouterService, organization_id: &str) -> bool {
    if organization_id.is_empty() {
        return false;
    }
    match api
        .list_documents(organization_id, 0, CONNECTION_PROBE_LIMIT)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            warn!("Connection test failed: {:?}", e);
            false
        }
    }
}
