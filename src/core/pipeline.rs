// src/core/pipeline.rs
//! LaTeX to PDF: publish as snippet, wait for it to be served, compile, clean up

use std::sync::Arc;
use std::time::Duration;

use crate::app_log;
use crate::core::compiler_client::LatexCompiler;
use crate::core::config_manager::PropagationSettings;
use crate::core::error::ServiceError;
use crate::core::snippet::{Snippet, SnippetHost, SnippetLease};
use crate::utils::truncate_chars;

pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Smallest document the compiler accepts, used to smoke-test the pipeline
pub const MINIMAL_DOCUMENT: &str = r"\documentclass{article}
\begin{document}
Hello World!
\end{document}";

/// How long to wait for a fresh snippet to become fetchable.
///
/// With `attempts == 1` this is a single fixed delay followed by one check.
/// Larger values poll, doubling the pause between checks from `backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationPolicy {
    pub initial_delay: Duration,
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for PropagationPolicy {
    fn default() -> Self {
        Self::from(&PropagationSettings::default())
    }
}

impl From<&PropagationSettings> for PropagationPolicy {
    fn from(settings: &PropagationSettings) -> Self {
        Self {
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            attempts: settings.attempts.max(1),
            backoff: Duration::from_millis(settings.backoff_ms),
        }
    }
}

impl PropagationPolicy {
    /// Pause before the given retry (1-based): backoff, 2x backoff, 4x backoff...
    fn pause_before_retry(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.backoff.saturating_mul(factor)
    }
}

pub struct LatexPipeline {
    snippets: Arc<dyn SnippetHost>,
    compiler: Arc<dyn LatexCompiler>,
    propagation: PropagationPolicy,
}

impl LatexPipeline {
    pub fn new(
        snippets: Arc<dyn SnippetHost>,
        compiler: Arc<dyn LatexCompiler>,
        propagation: PropagationPolicy,
    ) -> Self {
        Self {
            snippets,
            compiler,
            propagation,
        }
    }

    /// Compile LaTeX source to PDF bytes.
    ///
    /// The temporary snippet is deleted on every path once it exists.
    pub async fn compile(&self, latex: &str) -> Result<Vec<u8>, ServiceError> {
        self.snippets.ensure_credentials()?;

        let snippet = self.snippets.create(latex).await?;
        let lease = SnippetLease::new(Arc::clone(&self.snippets), snippet);

        let outcome = self.compile_published(lease.snippet()).await;
        lease.release().await;

        match &outcome {
            Ok(pdf) => app_log!(info, "Compiled PDF ({} bytes)", pdf.len()),
            Err(e) => app_log!(error, "Compilation pipeline failed: {}", e),
        }
        outcome
    }

    async fn compile_published(&self, snippet: &Snippet) -> Result<Vec<u8>, ServiceError> {
        self.wait_until_available(snippet).await?;
        let body = self.compiler.compile_url(&snippet.raw_url).await?;
        ensure_pdf(body)
    }

    async fn wait_until_available(&self, snippet: &Snippet) -> Result<(), ServiceError> {
        tokio::time::sleep(self.propagation.initial_delay).await;

        let mut last_failure = None;
        for attempt in 1..=self.propagation.attempts {
            if attempt > 1 {
                tokio::time::sleep(self.propagation.pause_before_retry(attempt - 1)).await;
            }

            match self.snippets.check_available(snippet).await {
                Ok(200) => return Ok(()),
                Ok(status) => {
                    app_log!(
                        warn,
                        "Snippet {} not served yet (status {}, attempt {}/{})",
                        snippet.id,
                        status,
                        attempt,
                        self.propagation.attempts
                    );
                    last_failure = Some(ServiceError::Upstream(format!(
                        "Snippet not accessible: {}",
                        status
                    )));
                }
                Err(e) => {
                    app_log!(
                        warn,
                        "Snippet {} availability check failed (attempt {}/{}): {}",
                        snippet.id,
                        attempt,
                        self.propagation.attempts,
                        e
                    );
                    last_failure = Some(e);
                }
            }
        }

        Err(last_failure
            .unwrap_or_else(|| ServiceError::Upstream("Snippet not accessible".to_string())))
    }
}

/// Accept only a non-empty body carrying the PDF signature
fn ensure_pdf(body: Vec<u8>) -> Result<Vec<u8>, ServiceError> {
    if body.starts_with(PDF_SIGNATURE) {
        return Ok(body);
    }

    let preview = truncate_chars(&String::from_utf8_lossy(&body), 200);
    Err(ServiceError::Compilation {
        status: 200,
        body: if body.is_empty() {
            "Compiler returned an empty document".to_string()
        } else {
            format!("Compiler did not return a PDF: {}", preview)
        },
    })
}
