//! refbook-server binary.
//!
//! Reads `.env`, then `REFBOOK_CONFIG` (optional file) and the `REFBOOK_*`
//! overrides, and serves the API on `REFBOOK_HOST:REFBOOK_PORT`.

use std::error::Error;
use std::net::SocketAddr;

use refbook_core::RefbookConfig;
use refbook_server::{create_server, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

fn init_tracing() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::from_default_env()
        .add_directive(Level::INFO.into())
        .add_directive("refbook_server=debug".parse()?);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
    Ok(())
}

fn listen_addr() -> Result<SocketAddr, Box<dyn Error>> {
    let host = std::env::var("REFBOOK_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match std::env::var("REFBOOK_PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .map_err(|e| format!("REFBOOK_PORT '{}' is not a port number: {}", raw, e))?,
        Err(_) => DEFAULT_PORT,
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

fn load_config() -> Result<RefbookConfig, Box<dyn Error>> {
    let base = match std::env::var("REFBOOK_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading config file");
            RefbookConfig::from_file(path)?
        }
        Err(_) => RefbookConfig::default(),
    };
    Ok(base.with_env_overrides())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
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
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = sigterm => {}
    }
    info!("Shutting down refbook-server");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = load_config()?;
    let app = create_server(AppState::from_config(&config)?);

    let addr = listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "refbook-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("refbook-server exited");
    Ok(())
}
