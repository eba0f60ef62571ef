#![allow(unused_crate_dependencies)]

use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use videogen_config::AppConfig;
use videogen_core::POLL_WORKER_CALLER;
use videogen_core::RATE_LIMIT_API;
use videogen_core::SUBMIT_WORKER_CALLER;
use videogen_provider::HttpVideoProvider;
use videogen_provider::VideoProvider;
use videogen_server::router;
use videogen_server::AppState;
use videogen_store::ControlPlaneStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    let store = ControlPlaneStore::open(&config.database_url).await?;
    store
        .seed_rate_limit(
            RATE_LIMIT_API,
            SUBMIT_WORKER_CALLER,
            config.submit_worker_max_calls,
            config.submit_worker_window_secs as u32,
        )
        .await?;
    store
        .seed_rate_limit(
            RATE_LIMIT_API,
            POLL_WORKER_CALLER,
            config.poll_worker_max_calls,
            config.poll_worker_window_secs as u32,
        )
        .await?;

    let http_client = reqwest::Client::new();
    let provider: Arc<dyn VideoProvider> = Arc::new(HttpVideoProvider::new(
        http_client,
        config.provider_base_url.clone(),
        config.provider_api_key.clone(),
    ));
    let state = AppState {
        store,
        provider,
        config: Arc::new(config),
    };

    let app = router(state);
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!(addr = %listener.local_addr()?, "videogen-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing() {
    let default_level = "info";
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
