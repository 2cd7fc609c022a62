// src/web/types.rs - Shared state and response types for the HTTP layer

use anyhow::{Context, Result};
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::{Json, Value};
use rocket::serde::Serialize;
use rocket::{Request, Response};
use std::sync::Arc;

use crate::core::{
    CompilerClient, ConfigManager, Database, GistClient, LatexPipeline, LatexSource,
    PropagationPolicy, ServiceError,
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Read-only state shared by every request
pub struct AppState {
    pub latex_source: Arc<dyn LatexSource>,
    pub pipeline: LatexPipeline,
}

impl AppState {
    pub fn new(latex_source: Arc<dyn LatexSource>, pipeline: LatexPipeline) -> Self {
        Self {
            latex_source,
            pipeline,
        }
    }

    /// Wire the real service clients around one pooled HTTP client
    pub fn from_config(config: &ConfigManager) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        let database = Database::new(client.clone(), config.database.clone());
        let gists = GistClient::new(client.clone(), config.snippets.clone());
        let compiler = CompilerClient::new(client, config.compiler.clone());

        let pipeline = LatexPipeline::new(
            Arc::new(gists),
            Arc::new(compiler),
            PropagationPolicy::from(&config.propagation),
        );

        Ok(Self::new(Arc::new(database), pipeline))
    }
}

pub struct PdfResponse {
    pub data: Vec<u8>,
    pub filename: Option<String>,
}

impl PdfResponse {
    pub fn with_filename(data: Vec<u8>, filename: &str) -> Self {
        Self {
            data,
            filename: Some(filename.to_string()),
        }
    }
}

impl<'r> Responder<'r, 'static> for PdfResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut binding = Response::build();
        let mut response = binding
            .header(ContentType::PDF)
            .sized_body(self.data.len(), std::io::Cursor::new(self.data));

        if let Some(filename) = self.filename {
            response = response.raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", filename),
            );
        }

        response.ok()
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Error,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

/// A classified failure rendered as a JSON error body with a matching status
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub body: StandardErrorResponse,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Configuration(_) => Status::InternalServerError,
            ServiceError::UpstreamData(_) | ServiceError::Upstream(_) => Status::BadGateway,
            ServiceError::Compilation { .. } => Status::BadRequest,
        };

        Self {
            status,
            body: StandardErrorResponse::new(
                err.to_string(),
                err.error_code().to_string(),
                err.suggestions(),
            ),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let mut response = Json(self.body).respond_to(request)?;
        response.set_status(self.status);
        Ok(response)
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct EndpointCatalog {
    #[serde(rename = "GET /")]
    pub root: &'static str,
    #[serde(rename = "GET /generate-cv")]
    pub generate_cv: &'static str,
    #[serde(rename = "GET /health")]
    pub health: &'static str,
    #[serde(rename = "GET /test-compile")]
    pub test_compile: &'static str,
    #[serde(rename = "GET /debug-latex")]
    pub debug_latex: &'static str,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: EndpointCatalog,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn ok(latex_length: usize) -> Self {
        Self {
            status: "ok",
            supabase: Some("connected"),
            latex_length: Some(latex_length),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: "error",
            supabase: None,
            latex_length: None,
            message: Some(message),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DebugLatexResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
