// src/web/mod.rs

pub mod cors_utils;
pub mod handlers;
pub mod types;

pub use cors_utils::Cors;
pub use handlers::*;
pub use types::*;

use crate::app_log;
use crate::core::ConfigManager;
use anyhow::Result;
use rocket::serde::json::Json;
use rocket::{catchers, get, routes, Build, Request, Rocket, State};

#[get("/")]
pub async fn root() -> Json<ServiceInfo> {
    handlers::root_handler().await
}

#[get("/health")]
pub async fn health(state: &State<AppState>) -> Json<HealthResponse> {
    handlers::health_handler(state).await
}

#[get("/generate-cv")]
pub async fn generate_cv(state: &State<AppState>) -> Result<PdfResponse, ApiError> {
    handlers::generate_cv_handler(state).await
}

#[get("/test-compile")]
pub async fn test_compile(state: &State<AppState>) -> Result<PdfResponse, ApiError> {
    handlers::test_compile_handler(state).await
}

#[get("/debug-latex")]
pub async fn debug_latex(state: &State<AppState>) -> Json<DebugLatexResponse> {
    handlers::debug_latex_handler(state).await
}

// Error catchers
#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {} {}", request.method(), request.uri()),
        "NOT_FOUND".to_string(),
        vec!["GET / lists the available endpoints".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Attach state, CORS, routes and catchers to a Rocket instance
pub fn mount_api(rocket: Rocket<Build>, state: AppState, cors: Cors) -> Rocket<Build> {
    rocket
        .attach(cors)
        .manage(state)
        .register("/", catchers![not_found, internal_error])
        .mount(
            "/",
            routes![
                root,
                health,
                generate_cv,
                test_compile,
                debug_latex,
                cors_utils::universal_options_handler,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let cors = Cors::new(config.server.cors_allowed_origin.clone());

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    app_log!(info, "Starting CV LaTeX compilation API server");
    app_log!(info, "Environment: {}", config.environment);
    app_log!(
        info,
        "Server: http://{}:{}",
        config.server.address,
        config.server.port
    );
    app_log!(info, "Database: {}", config.database.url);
    app_log!(info, "Snippet host: {}", config.snippets.api_url);
    app_log!(info, "Compiler: {}", config.compiler.url);

    let _rocket = mount_api(rocket::custom(figment), state, cors)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket server failed: {}", e))?;

    Ok(())
}
