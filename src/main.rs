use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use log::*;
use tokio::signal;

use pizza_crd_webhook::catalog::ReflectorCatalog;
use pizza_crd_webhook::conversion_handler::ConversionServer;
use pizza_crd_webhook::mutation_handler::MutationServer;
use pizza_crd_webhook::router::webhook_router;
use pizza_crd_webhook::validation_handler::ValidationServer;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Serving configuration, read from the environment
struct Config {
    cert_path: String,
    key_path: String,
    port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        let cert_path = std::env::var("TLS_CERT_PATH")
            .unwrap_or_else(|_| "./pizza-crd-webhook.crt".to_string());
        let key_path = std::env::var("TLS_KEY_PATH")
            .unwrap_or_else(|_| "./pizza-crd-webhook.key".to_string());
        let port = match std::env::var("PORT") {
            Ok(p) => p.parse::<u16>().with_context(|| format!("invalid PORT {:?}", p))?,
            Err(_) => 8443,
        };

        // check that the cert and key files exist
        for path in [&cert_path, &key_path] {
            if !Path::new(path).exists() {
                return Err(anyhow!("TLS file does not exist: {}", path));
            }
        }

        Ok(Self {
            cert_path,
            key_path,
            port,
        })
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting pizza-crd-webhook");

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let provider = rustls::crypto::ring::default_provider();
    rustls::crypto::CryptoProvider::install_default(provider)
        .map_err(|_| anyhow!("failed to install crypto provider"))?;

    let config = Config::from_env()?;
    let tls_config = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .context("failed to load TLS configuration")?;

    // in-cluster config, falling back to the local kubeconfig
    let client = kube::Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;
    let catalog = ReflectorCatalog::spawn(client);

    let app = webhook_router(
        MutationServer::new(),
        ValidationServer::new(Arc::new(catalog)),
        ConversionServer::new(),
    );

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting TLS server on {}", addr);
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_on_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
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
    info!("Shutting down, waiting up to {:?} for open connections", SHUTDOWN_TIMEOUT);
    handle.graceful_shutdown(Some(SHUTDOWN_TIMEOUT));
}
