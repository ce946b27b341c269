use anyhow::Context;

use crate::config::config;
use crate::routes;
use crate::state::AppState;

pub async fn handle(port: Option<u16>, api_url: Option<String>) -> anyhow::Result<()> {
    let mut app_config = config().clone();
    if let Some(port) = port {
        app_config.server.port = port;
    }
    if let Some(api_url) = api_url {
        app_config = app_config.with_api_url(api_url);
    }

    tracing::info!(
        "Starting console gateway in {:?} mode, backend {}",
        app_config.environment,
        app_config.backend.api_url
    );

    let bind_addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let state = AppState::new(app_config).context("failed to build backend client")?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Console gateway listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
