use anyhow::Context;
use api_compare_console::handlers::{api_router, comparison_handlers::AppStateInner, ApiDoc};
use api_compare_console::services::{CompareServiceClient, SessionService};
use api_compare_console::settings::Settings;
use api_compare_console::utils::validate_url;
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    validate_url(&settings.compare_service_url)
        .with_context(|| format!("invalid compare service url {}", settings.compare_service_url))?;

    // Create services
    let client = Arc::new(CompareServiceClient::new(&settings.compare_service_url)?);
    let sessions = Arc::new(SessionService::new(client.clone(), settings.session_ttl()));
    tracing::info!(compare_service = %client.base_url(), "using comparison service");
    let state = Arc::new(AppStateInner { client, sessions });

    let app = api_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(RequestBodyLimitLayer::new(settings.request_body_limit))
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    tracing::info!("Server running on http://{}", settings.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
