//! Nvgl8r - a password-protected photo drop.
//!
//! This binary parses the configuration, prepares the directories and
//! serves until interrupted.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nvgl8r::{
    config::Config,
    photos::PhotoBuffer,
    relay::RelayForwarder,
    server::{create_router, AppState, PasswordHash, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(config.verbose);

    // Validate configuration before touching the filesystem
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }
    let relay_target = match config.relay_target() {
        Ok(target) => target,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration:");
    info!("  Static dir: {}", config.static_dir.display());
    match relay_target {
        Some(ref target) => {
            info!("  Mode: relay to {}", target);
            info!("  Relay timeout: {}s", config.relay_timeout);
        }
        None => {
            info!("  Mode: local storage");
            info!("  Photos dir: {}", config.photos_dir.display());
            info!("  Capacity: {} photos", config.capacity);
        }
    }

    // Ensure required directories exist
    if let Err(e) = tokio::fs::create_dir_all(&config.static_dir).await {
        error!(
            "Failed to create static dir {}: {}",
            config.static_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let photos = PhotoBuffer::with_capacity(&config.photos_dir, config.capacity);
    if relay_target.is_none() {
        if let Err(e) = tokio::fs::create_dir_all(&config.photos_dir).await {
            error!(
                "Failed to create photos dir {}: {}",
                config.photos_dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
        // Photos never survive a restart
        photos.clear_all().await;
    }

    let mut state = AppState::new(&config.static_dir, photos);
    if let Some(target) = relay_target {
        match RelayForwarder::new(target, config.relay_timeout()) {
            Ok(relay) => state = state.with_relay(relay),
            Err(e) => {
                error!("Failed to set up relay: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let router_config = RouterConfig::new(PasswordHash::generate(&config.password))
        .with_max_upload_size(config.max_upload_size)
        .with_tracing(!config.no_tracing);
    let router = create_router(state.clone(), router_config);

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server started on http://{}", addr);
    info!("  Monitor: http://{}/monitor.html", addr);
    info!("  Capture: http://{}/capture.html", addr);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if !state.is_relay() {
        state.photos.clear_all().await;
    }

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "nvgl8r=debug,tower_http=debug"
    } else {
        "nvgl8r=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutting down...");
}
