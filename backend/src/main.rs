//! Main entry point for the Innkeeper backend.
//!
//! Initializes tracing and configuration, connects to the database, runs
//! migrations, registers the background tasks and serves the API until a
//! shutdown signal arrives.

use backend::config::AppConfig;
use backend::{auth, build_gateway, build_router, database, services, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env();

    let pool = database::connect(&config.database_url)
        .await
        .map_err(|err| format!("database connect failed: {err}"))?;
    database::run_migrations(&pool)
        .await
        .map_err(|err| format!("migrations failed: {err}"))?;

    if let Some(token) = &config.bootstrap_admin_token {
        auth::service::ensure_bootstrap_admin(&pool, token)
            .await
            .map_err(|err| format!("bootstrap admin failed: {err}"))?;
    }

    let gateway = build_gateway(&config).map_err(|err| format!("sms gateway: {err}"))?;
    let bind_addr = config.bind_addr.clone();
    let run_background = config.run_background_tasks;
    let state = AppState::new(pool, config, gateway);

    if run_background {
        services::spawn_background_tasks(&state);
    }

    let app = build_router(state);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| format!("bind {bind_addr} failed: {err}"))?;
    info!("innkeeper backend listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|err| format!("server failed: {err}"))
}
