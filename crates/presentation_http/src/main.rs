//! tasksync HTTP server

use std::{sync::Arc, time::Duration};

use axum::http::{HeaderValue, Method};
use infrastructure::{
    AppConfig, GoogleCalendarAdapter, GoogleOAuthAdapter, SqliteCredentialStore, SqliteTaskStore,
    create_pool,
};
use presentation_http::{
    ApiKeyAuthLayer, AppState, RequestIdLayer, create_router, set_expose_internal_errors,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "tasksync_server=debug,presentation_http=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log format comes from the config, so report load errors once tracing is up
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_tracing(config.server.json_logs());
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "tasksync starting"
    );

    let warnings = config.warn_on_insecure_settings();
    if warnings > 0 {
        warn!(count = warnings, "Configuration has security warnings");
    }
    set_expose_internal_errors(!config.is_production());

    let pool = Arc::new(create_pool(&config.database)?);
    info!(path = %config.database.path, "Database ready");

    let google = &config.google_calendar;
    let provider = Arc::new(GoogleOAuthAdapter::new(google.oauth_config())?);
    let calendar = Arc::new(GoogleCalendarAdapter::new(google.calendar_config())?);
    if !google.is_configured() {
        warn!("Google Calendar is not configured; sync operations will report not_configured");
    }

    let state = AppState::new(
        provider,
        calendar,
        Arc::new(SqliteCredentialStore::new(Arc::clone(&pool))),
        Arc::new(SqliteTaskStore::new(pool)),
        google.sync_config(),
    );

    let auth_layer = if config.security.has_api_keys() {
        ApiKeyAuthLayer::from_api_keys(config.security.api_keys.clone())
    } else {
        info!("No API keys configured; running in single-user mode");
        ApiKeyAuthLayer::disabled()
    };

    // First added = innermost
    let app = create_router(state)
        .layer(auth_layer)
        .layer(RequestBodyLimitLayer::new(
            config.server.max_body_size_json_bytes,
        ))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new());

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");

    let shutdown_timeout = config.server.shutdown_timeout();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.server.cors_enabled {
        return CorsLayer::new();
    }

    if config.server.allowed_origins.is_empty() {
        if config.is_production() {
            warn!("CORS allows any origin in production; set server.allowed_origins");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any)
    }
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }

    info!(?timeout, "Waiting for open connections to close");
}
