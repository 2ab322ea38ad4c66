//! Backend entry-point: loads configuration, selects the user store and serves
//! the users API.

mod server;

use actix_web::web;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::config::UsersSettings;
use backend::inbound::http::health::HealthState;
use server::{ServerConfig, create_server, drain_on};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = UsersSettings::load_from_args(std::env::args_os())
        .and_then(|settings| settings.validate())
        .map_err(|err| {
            error!(error = %err, "invalid configuration");
            std::io::Error::other(err)
        })?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), ServerConfig::from(settings))?;
    actix_web::rt::spawn(drain_on(health_state, server.handle(), shutdown_signal()));
    server.await
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
///
/// If no handler can be installed the future never resolves, leaving the
/// server running rather than draining it immediately.
async fn shutdown_signal() {
    if let Err(err) = wait_for_signal().await {
        error!(error = %err, "failed to install shutdown signal handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
