// src/core/gist_client.rs
//! GitHub Gist backed snippet host

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::app_log;
use crate::core::config_manager::SnippetSettings;
use crate::core::error::ServiceError;
use crate::core::snippet::{Snippet, SnippetHost};
use crate::utils::{truncate_chars, ERROR_BODY_LIMIT};

const GISTS_ENDPOINT: &str = "/gists";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Serialize)]
struct CreateGist<'a> {
    description: &'a str,
    public: bool,
    files: HashMap<&'a str, GistFileContent<'a>>,
}

#[derive(Serialize)]
struct GistFileContent<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedGist {
    id: String,
    files: HashMap<String, CreatedGistFile>,
}

#[derive(Debug, Deserialize)]
struct CreatedGistFile {
    raw_url: String,
}

pub struct GistClient {
    client: reqwest::Client,
    settings: SnippetSettings,
}

impl GistClient {
    pub fn new(client: reqwest::Client, settings: SnippetSettings) -> Self {
        Self { client, settings }
    }

    fn token(&self) -> Result<&str, ServiceError> {
        self.settings
            .token
            .as_deref()
            .ok_or_else(|| ServiceError::Configuration("GITHUB_TOKEN not configured".to_string()))
    }

    fn create_request(&self, token: &str, content: &str) -> reqwest::RequestBuilder {
        let mut files = HashMap::new();
        files.insert(self.settings.file_name.as_str(), GistFileContent { content });

        let payload = CreateGist {
            description: &self.settings.description,
            public: true,
            files,
        };

        self.client
            .post(format!("{}{}", self.settings.api_url, GISTS_ENDPOINT))
            .header("Authorization", format!("token {}", token))
            .header("Accept", GITHUB_ACCEPT)
            .json(&payload)
            .timeout(self.settings.create_timeout())
    }

    fn snippet_from(&self, created: CreatedGist) -> Result<Snippet, ServiceError> {
        let file = created
            .files
            .get(&self.settings.file_name)
            .ok_or_else(|| {
                ServiceError::Upstream(format!(
                    "Gist {} does not contain {}",
                    created.id, self.settings.file_name
                ))
            })?;

        Ok(Snippet {
            raw_url: file.raw_url.clone(),
            id: created.id,
        })
    }
}

#[rocket::async_trait]
impl SnippetHost for GistClient {
    fn ensure_credentials(&self) -> Result<(), ServiceError> {
        self.token().map(|_| ())
    }

    async fn create(&self, content: &str) -> Result<Snippet, ServiceError> {
        let token = self.token()?;
        app_log!(trace, "Creating gist ({} chars)", content.chars().count());

        let response = self
            .create_request(token, content)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("Gist creation request failed", e))?;

        let status = response.status();
        if status != reqwest::StatusCode::CREATED {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "Gist creation failed with status {}: {}", status, error_text);
            return Err(ServiceError::Upstream(format!(
                "Error creating Gist: {} {}",
                status,
                truncate_chars(&error_text, ERROR_BODY_LIMIT)
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::upstream("Failed to parse Gist creation response", e))?;

        // The gist exists from here on; anything unusable is deleted before failing
        let id = body.get("id").and_then(|id| id.as_str()).map(str::to_string);
        let parsed = serde_json::from_value::<CreatedGist>(body)
            .map_err(|e| {
                ServiceError::Upstream(format!("Unexpected Gist creation response: {}", e))
            })
            .and_then(|created| self.snippet_from(created));

        match (parsed, id) {
            (Ok(snippet), _) => {
                app_log!(info, "Created gist {} at {}", snippet.id, snippet.raw_url);
                Ok(snippet)
            }
            (Err(err), Some(id)) => {
                app_log!(warn, "Discarding unusable gist {}: {}", id, err);
                if let Err(delete_err) = self.delete(&id).await {
                    app_log!(warn, "Failed to delete gist {}: {}", id, delete_err);
                }
                Err(err)
            }
            (Err(err), None) => Err(err),
        }
    }

    async fn check_available(&self, snippet: &Snippet) -> Result<u16, ServiceError> {
        let response = self
            .client
            .get(&snippet.raw_url)
            .timeout(self.settings.check_timeout())
            .send()
            .await
            .map_err(|e| ServiceError::upstream("Gist raw content request failed", e))?;

        Ok(response.status().as_u16())
    }

    async fn delete(&self, snippet_id: &str) -> Result<(), ServiceError> {
        let token = self.token()?;

        let response = self
            .client
            .delete(format!(
                "{}{}/{}",
                self.settings.api_url, GISTS_ENDPOINT, snippet_id
            ))
            .header("Authorization", format!("token {}", token))
            .header("Accept", GITHUB_ACCEPT)
            .timeout(self.settings.delete_timeout())
            .send()
            .await
            .map_err(|e| ServiceError::upstream("Gist deletion request failed", e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Upstream(format!(
                "Gist deletion returned status {}",
                status
            )))
        }
    }
}
