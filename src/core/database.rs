// src/core/database.rs
//! Supabase access - the LaTeX source lives behind a PostgREST RPC

use serde_json::Value;

use crate::app_log;
use crate::core::config_manager::DatabaseSettings;
use crate::core::error::ServiceError;
use crate::utils::{self, json_display_len, json_is_truthy, json_item_len, json_type_name};

/// Anything that can hand out the current LaTeX document
#[rocket::async_trait]
pub trait LatexSource: Send + Sync {
    /// Name of the remote procedure, for logs and diagnostics
    fn rpc_name(&self) -> &str;

    async fn fetch_latex(&self) -> Result<RpcPayload, ServiceError>;
}

/// Raw result of an RPC call, kept as JSON until a caller decides how to read it
#[derive(Debug, Clone, PartialEq)]
pub struct RpcPayload(pub Value);

impl RpcPayload {
    pub fn is_empty(&self) -> bool {
        !json_is_truthy(&self.0)
    }

    pub fn type_name(&self) -> &'static str {
        json_type_name(&self.0)
    }

    pub fn display_len(&self) -> usize {
        json_display_len(&self.0)
    }

    /// Characters of a string, entries of an array or object
    pub fn item_len(&self) -> usize {
        json_item_len(&self.0)
    }

    /// Turn the payload into LaTeX source, rejecting empty or non-text results
    pub fn into_latex(self, rpc_name: &str) -> Result<String, ServiceError> {
        if self.is_empty() {
            return Err(ServiceError::UpstreamData(format!(
                "The function {}() returned no data",
                rpc_name
            )));
        }
        match self.0 {
            Value::String(latex) => Ok(latex),
            other => Err(ServiceError::UpstreamData(format!(
                "The function {}() returned {} instead of LaTeX text",
                rpc_name,
                json_type_name(&other)
            ))),
        }
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

pub struct Database {
    client: reqwest::Client,
    settings: DatabaseSettings,
}

impl Database {
    pub fn new(client: reqwest::Client, settings: DatabaseSettings) -> Self {
        Self { client, settings }
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.settings.url, self.settings.rpc_function)
    }
}

#[rocket::async_trait]
impl LatexSource for Database {
    fn rpc_name(&self) -> &str {
        &self.settings.rpc_function
    }

    async fn fetch_latex(&self) -> Result<RpcPayload, ServiceError> {
        let url = self.rpc_url();
        app_log!(trace, "Calling database RPC: {}", url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(&self.settings.anon_key)
            .json(&serde_json::json!({}))
            .timeout(self.settings.timeout())
            .send()
            .await
            .map_err(|e| ServiceError::upstream("Database RPC request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "Database RPC error response: {}", error_text);
            return Err(ServiceError::Upstream(format!(
                "Database RPC {}() returned status {}: {}",
                self.settings.rpc_function,
                status,
                utils::truncate_chars(&error_text, utils::ERROR_BODY_LIMIT)
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::upstream("Failed to parse database RPC response", e))?;

        app_log!(
            info,
            "Database RPC {}() returned {} ({} chars)",
            self.settings.rpc_function,
            json_type_name(&value),
            json_display_len(&value)
        );

        Ok(RpcPayload(value))
    }
}
