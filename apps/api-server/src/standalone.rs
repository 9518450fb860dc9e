use crate::{ai::init_caption_model, routes::get_routes, Config, Ctx};
use std::sync::Arc;

pub async fn start_server() -> anyhow::Result<()> {
    // also loads .env, so it has to run before reading the config
    analytics_tracing::init_tracing();

    let config = Config::from_env()?;
    tracing::debug!("config: {:?}", config);

    // one caption model per process, shared by every request
    let caption_model = init_caption_model(&config)?;
    let ctx = Ctx::new(&config, Arc::new(caption_model)).await?;

    let app = get_routes(ctx);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };
    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl-C received, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, shutting down...");
        },
    }
}
