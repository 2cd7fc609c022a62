// src/core/compiler_client.rs
//! LaTeX.Online client - compiles a document it fetches from a public URL

use crate::app_log;
use crate::core::config_manager::CompilerSettings;
use crate::core::error::ServiceError;
use crate::utils::{truncate_chars, ERROR_BODY_LIMIT};

const COMPILE_ENDPOINT: &str = "/compile";

#[rocket::async_trait]
pub trait LatexCompiler: Send + Sync {
    /// Compile the document served at `source_url`, returning the raw response body
    async fn compile_url(&self, source_url: &str) -> Result<Vec<u8>, ServiceError>;
}

pub struct CompilerClient {
    client: reqwest::Client,
    settings: CompilerSettings,
}

impl CompilerClient {
    pub fn new(client: reqwest::Client, settings: CompilerSettings) -> Self {
        Self { client, settings }
    }

    fn compile_request(&self, source_url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.settings.url, COMPILE_ENDPOINT);
        self.client
            .get(url)
            .query(&[("url", source_url)])
            .timeout(self.settings.timeout())
    }
}

#[rocket::async_trait]
impl LatexCompiler for CompilerClient {
    async fn compile_url(&self, source_url: &str) -> Result<Vec<u8>, ServiceError> {
        app_log!(info, "Requesting compilation of {}", source_url);

        let response = self
            .compile_request(source_url)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("LaTeX compiler request failed", e))?;

        let status = response.status();
        app_log!(trace, "Compiler response status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "Compiler error response: {}", error_text);
            return Err(ServiceError::Compilation {
                status: status.as_u16(),
                body: truncate_chars(&error_text, ERROR_BODY_LIMIT),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::upstream("Failed to read compiler response", e))?;

        Ok(body.to_vec())
    }
}
