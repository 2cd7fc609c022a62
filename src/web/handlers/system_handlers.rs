// src/web/handlers/system_handlers.rs
use crate::app_log;
use crate::web::types::*;

use rocket::serde::json::Json;
use rocket::State;

pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "CV Generator API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: EndpointCatalog {
            root: "API Information",
            generate_cv: "Generate CV PDF",
            health: "Health check",
            test_compile: "Test LaTeX compilation",
            debug_latex: "Debug LaTeX code",
        },
    })
}

/// Reports database connectivity; failures become a status field, never an error response
pub async fn health_handler(state: &State<AppState>) -> Json<HealthResponse> {
    match state.latex_source.fetch_latex().await {
        Ok(payload) => {
            app_log!(info, "Health check ok, latex_length: {}", payload.item_len());
            Json(HealthResponse::ok(payload.item_len()))
        }
        Err(e) => {
            app_log!(warn, "Health check failed: {}", e);
            Json(HealthResponse::error(e.to_string()))
        }
    }
}

pub async fn debug_latex_handler(state: &State<AppState>) -> Json<DebugLatexResponse> {
    match state.latex_source.fetch_latex().await {
        Ok(payload) => Json(DebugLatexResponse {
            success: true,
            data_type: Some(payload.type_name()),
            length: Some(payload.display_len()),
            data: Some(payload.into_value()),
            error: None,
        }),
        Err(e) => {
            app_log!(warn, "Debug fetch of LaTeX failed: {}", e);
            Json(DebugLatexResponse {
                success: false,
                data: None,
                data_type: None,
                length: None,
                error: Some(e.to_string()),
            })
        }
    }
}
