use std::sync::Arc;

use anyhow::Context;
use session_issuer::{
    config::Config,
    routes::{app_router, cors_layer},
    state::AppState,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_issuer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env().context("load config")?;
    let state = Arc::new(AppState::new(&cfg).await.context("init state")?);

    let app = app_router(state)
        .layer(cors_layer(&cfg.http).context("CORS_ORIGIN is not a valid origin")?)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&cfg.http.bind_addr)
        .await
        .with_context(|| format!("bind {}", cfg.http.bind_addr))?;
    tracing::info!(addr = %cfg.http.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed");
    }
    tracing::info!("shutting down");
}
