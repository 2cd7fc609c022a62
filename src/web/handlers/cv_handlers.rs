// src/web/handlers/cv_handlers.rs
//! PDF producing handlers
use crate::core::pipeline::MINIMAL_DOCUMENT;
use crate::web::types::{ApiError, AppState, PdfResponse};
use crate::{app_log, app_span};

use rocket::State;
use tracing::Instrument;

pub async fn generate_cv_handler(state: &State<AppState>) -> Result<PdfResponse, ApiError> {
    let rpc_name = state.latex_source.rpc_name().to_string();
    let span = app_span!("cv_generation", rpc = %rpc_name);

    async move {
        let payload = state.latex_source.fetch_latex().await?;
        let latex = payload.into_latex(&rpc_name).inspect_err(|e| {
            app_log!(error, "Unusable LaTeX from database: {}", e);
        })?;

        app_log!(info, "Fetched LaTeX source ({} chars)", latex.chars().count());

        let pdf = state.pipeline.compile(&latex).await?;
        Ok::<_, ApiError>(PdfResponse::with_filename(pdf, "CV.pdf"))
    }
    .instrument(span)
    .await
}

/// Compile a fixed minimal document, independent of the database
pub async fn test_compile_handler(state: &State<AppState>) -> Result<PdfResponse, ApiError> {
    async move {
        let pdf = state.pipeline.compile(MINIMAL_DOCUMENT).await?;
        Ok::<_, ApiError>(PdfResponse::with_filename(pdf, "test.pdf"))
    }
    .instrument(app_span!("test_compile"))
    .await
}
