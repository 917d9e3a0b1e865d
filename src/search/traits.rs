use crate::model::{SearchError, SearchRequest};
use serde_json::Value;

/// Returns the raw response body so the ranks dump persists the upstream
/// document verbatim; decoding happens in the cycle.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, req: &SearchRequest) -> Result<Value, SearchError>;
}
