// src/core/snippet.rs
//! Temporary public snippets used to hand LaTeX source to the compiler by URL

use std::sync::Arc;

use crate::app_log;
use crate::core::error::ServiceError;

/// A published snippet: host-side identifier plus the URL serving its raw content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: String,
    pub raw_url: String,
}

#[rocket::async_trait]
pub trait SnippetHost: Send + Sync {
    /// Fail without touching the network when the host cannot be used
    fn ensure_credentials(&self) -> Result<(), ServiceError>;

    async fn create(&self, content: &str) -> Result<Snippet, ServiceError>;

    /// Fetch the raw URL and report the HTTP status it answered with
    async fn check_available(&self, snippet: &Snippet) -> Result<u16, ServiceError>;

    async fn delete(&self, snippet_id: &str) -> Result<(), ServiceError>;
}

/// Ownership of a created snippet for the duration of one request.
///
/// `release` deletes the snippet. A lease dropped without being released
/// (the request future was cancelled) schedules the deletion on the runtime.
pub struct SnippetLease {
    host: Arc<dyn SnippetHost>,
    snippet: Snippet,
    released: bool,
}

impl SnippetLease {
    pub fn new(host: Arc<dyn SnippetHost>, snippet: Snippet) -> Self {
        Self {
            host,
            snippet,
            released: false,
        }
    }

    pub fn snippet(&self) -> &Snippet {
        &self.snippet
    }

    /// Delete the snippet. Failures are logged, never returned.
    pub async fn release(mut self) {
        delete_best_effort(self.host.as_ref(), &self.snippet.id).await;
        self.released = true;
    }
}

impl Drop for SnippetLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let host = Arc::clone(&self.host);
        let snippet_id = self.snippet.id.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                app_log!(
                    warn,
                    "Snippet {} dropped before release, scheduling deletion",
                    snippet_id
                );
                handle.spawn(async move {
                    delete_best_effort(host.as_ref(), &snippet_id).await;
                });
            }
            Err(_) => {
                app_log!(
                    error,
                    "Snippet {} could not be deleted: no async runtime available",
                    snippet_id
                );
            }
        }
    }
}

async fn delete_best_effort(host: &dyn SnippetHost, snippet_id: &str) {
    match host.delete(snippet_id).await {
        Ok(()) => app_log!(info, "Deleted temporary snippet {}", snippet_id),
        Err(e) => app_log!(warn, "Failed to delete temporary snippet {}: {}", snippet_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fakes::{CallLog, FakeSnippetHost};

    #[tokio::test]
    async fn test_release_deletes_once() {
        let log = CallLog::new();
        let host = Arc::new(FakeSnippetHost::new(log.clone()));
        let snippet = host.create("content").await.unwrap();

        let lease = SnippetLease::new(host.clone(), snippet.clone());
        assert_eq!(lease.snippet(), &snippet);
        lease.release().await;

        assert_eq!(log.count("delete"), 1);
        assert!(host.stored_ids().is_empty());
    }

    #[tokio::test]
    async fn test_release_swallows_delete_failure() {
        let log = CallLog::new();
        let host = Arc::new(FakeSnippetHost::new(log.clone()).failing_delete());
        let snippet = host.create("content").await.unwrap();

        SnippetLease::new(host.clone(), snippet).release().await;

        assert_eq!(log.count("delete"), 1);
    }

    #[tokio::test]
    async fn test_dropped_lease_schedules_deletion() {
        let log = CallLog::new();
        let host = Arc::new(FakeSnippetHost::new(log.clone()));
        let snippet = host.create("content").await.unwrap();

        drop(SnippetLease::new(host.clone(), snippet));

        for _ in 0..10 {
            if log.count("delete") == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(log.count("delete"), 1);
        assert!(host.stored_ids().is_empty());
    }
}
