//! CommerceWave Storefront - public JSON storefront service.
//!
//! This binary serves the storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, JSON responses rendered by a separate front end
//! - `PostgreSQL` for accounts, orders and sessions; in-memory fallbacks
//!   when no database URL is configured
//! - Claude for the support chatbot and product recommendations

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commerce_wave_storefront::ai::{ClaudeClient, PromptRunner, UnconfiguredRunner};
use commerce_wave_storefront::config::StorefrontConfig;
use commerce_wave_storefront::db;
use commerce_wave_storefront::middleware::RateLimiting;
use commerce_wave_storefront::state::{AppState, Backends};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.sentry.environment.clone().into()),
            sample_rate: config.sentry.sample_rate,
            traces_sample_rate: config.sentry.traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "commerce_wave_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Claude when configured, otherwise a runner whose calls always fail.
fn prompt_runner(config: &StorefrontConfig) -> Arc<dyn PromptRunner> {
    let Some(claude) = config.claude.as_ref() else {
        tracing::warn!("ANTHROPIC_API_KEY not set; chat and recommendations will use fallbacks");
        return Arc::new(UnconfiguredRunner);
    };

    match ClaudeClient::new(claude) {
        Ok(client) => {
            tracing::info!(model = %claude.model, "Claude client initialized");
            Arc::new(client)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Claude client; using fallbacks");
            Arc::new(UnconfiguredRunner)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing is not up yet
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Storefront exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let prompts = prompt_runner(&config);
    let addr = config.socket_addr();

    // Migrations are NOT run on startup: `cargo run -p commerce-wave-cli -- migrate`
    let app = if let Some(database_url) = config.database_url.clone() {
        let pool = db::create_pool(&database_url).await?;
        tracing::info!("Database pool created");

        let session_store = PostgresStore::new(pool.clone());
        let state = AppState::new(config, Backends::postgres(pool, prompts));
        commerce_wave_storefront::app(state, session_store, RateLimiting::Enabled)
    } else {
        tracing::warn!(
            "No database configured; accounts, orders and sessions are kept in memory"
        );
        let state = AppState::new(config, Backends::in_memory(prompts));
        commerce_wave_storefront::app(state, MemoryStore::default(), RateLimiting::Enabled)
    };

    // Sentry layers (outermost for full request coverage)
    let app = app
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("storefront listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
