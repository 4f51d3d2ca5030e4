use crate::ports::outbound::card_store::{CardStore, StoreError};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

/// Per-request values the resolvers need.
#[derive(Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub store: Arc<dyn CardStore>,
    pub deadline: Instant,
}

impl RequestContext {
    #[must_use]
    pub fn new(store: Arc<dyn CardStore>, timeout: Duration) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            store,
            deadline: Instant::now() + timeout,
        }
    }

    /// Runs a store operation under the request deadline.
    pub async fn call<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match timeout_at(self.deadline, operation).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("[{}] Store call exceeded the request deadline", self.request_id);
                Err(StoreError::DeadlineExceeded)
            }
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
