mod api;
mod middleware;

use std::sync::Arc;

use pagewatch_notify::{NotificationService, TelegramClient};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pagewatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let dispatcher = TelegramClient::from_config(&config)?;
    let service = Arc::new(NotificationService::new(dispatcher));

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        bot_token_set = config.bot_token_set(),
        chat_id_set = config.chat_id_set(),
        "telegram notification service starting"
    );
    if service.is_configured() {
        tracing::info!("ready to receive notifications");
    } else {
        tracing::warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not configured; dispatches will fail");
    }

    let app = build_app(AppState { service }, rate_limit_state(config.notify_rate_limit));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM. A handler that cannot be
/// installed is logged and never resolves, so the other one still works.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = sigterm => {},
    }

    tracing::info!("shutting down; draining in-flight notifications");
}
