//! Wiring & DI. Entry point: load config, bootstrap adapters, inject into the
//! dispatcher, serve the webhook. No routing logic here.

use dental_desk::adapters::channel::{Capabilities, ConnectorClient, WebhookState, router};
use dental_desk::adapters::knowledge_base::LanguageKbAdapter;
use dental_desk::adapters::nlu::LuisRecognizer;
use dental_desk::adapters::scheduler::HttpScheduler;
use dental_desk::ports::{KnowledgeBasePort, RecognizerPort, ReplyPort, SchedulerPort, TurnHandler};
use dental_desk::shared::config::AppConfig;
use dental_desk::usecases::TurnDispatcher;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    // --- Recognizer: capability decided once, here ---
    let recognizer_settings = cfg.recognizer_settings();
    if recognizer_settings.is_none() {
        warn!("LUIS_APP_ID / LUIS_API_KEY / LUIS_API_HOST_NAME incomplete; intent recognition disabled");
    }
    let recognizer = Arc::new(LuisRecognizer::new(recognizer_settings));

    // --- Knowledge base ---
    let kb_settings = cfg.knowledge_base_settings();
    if kb_settings.is_none() {
        warn!("knowledge base not configured; questions will get the fallback reply");
    }
    let knowledge_base = Arc::new(LanguageKbAdapter::new(kb_settings));

    // --- Scheduler ---
    let scheduler_url = cfg.scheduler_url_or_default();
    info!(url = %scheduler_url, "scheduler backend");
    let scheduler: Arc<dyn SchedulerPort> = Arc::new(HttpScheduler::new(scheduler_url));

    // --- Channel connector ---
    let credentials = cfg.channel_credentials();
    if credentials.is_none() {
        info!("no channel credentials; replies are sent unauthenticated (emulator mode)");
    }

    let capabilities = Capabilities {
        recognizer: recognizer.is_enabled(),
        knowledge_base: knowledge_base.is_enabled(),
        authenticated_channel: credentials.is_some(),
    };
    let replies: Arc<dyn ReplyPort> = Arc::new(ConnectorClient::new(credentials));

    let dispatcher: Arc<dyn TurnHandler> = Arc::new(TurnDispatcher::new(
        recognizer as Arc<dyn RecognizerPort>,
        knowledge_base as Arc<dyn KnowledgeBasePort>,
        scheduler,
    ));

    let app = router(WebhookState::new(dispatcher, replies, capabilities));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port_or_default()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {}: {}", addr, e))?;
    info!(address = %addr, "listening for channel activities on /api/messages");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server: {}", e))?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
