use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_recs::{
    api::{create_router, AppState, ConfigSummary},
    config::Config,
    services::build_recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing secrets stop the process before anything is built
    let config = Config::from_env().inspect_err(|e| tracing::error!(error = %e, "Startup halted"))?;

    tracing::info!(
        api_base = %config.openai_api_base,
        model = %config.openai_model,
        backend = %config.backend,
        "Configuration loaded"
    );

    let recommender = build_recommender(&config)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Backend initialization failed"))?;

    let state = AppState::new(recommender, ConfigSummary::from(&config));
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app).await?;

    Ok(())
}
