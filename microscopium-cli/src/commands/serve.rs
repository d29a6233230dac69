//! `microscopium serve` command - Run the web server.

use std::sync::Arc;

use microscopium_axum::{AppState, WebConfig, create_router};
use microscopium_mongodb::{DocumentStore, MemoryStore, MongoClient};
use microscopium_query::logging;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::cli::ServeArgs;
use crate::commands::load_config;
use crate::error::{CliError, CliResult};
use crate::output::{self, kv};

/// Run the serve command
pub async fn run(args: ServeArgs) -> CliResult<()> {
    logging::init();

    let mut config = load_config(&args.connection)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(minify) = args.minify_html {
        config.server.minify_html = Some(minify);
    }

    let web = WebConfig {
        minify_html: config.minify_html(),
    };

    let (store, client): (Arc<dyn DocumentStore>, Option<MongoClient>) = match args.fixtures {
        Some(ref dir) => {
            let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::load_dir(dir)?);
            output::info(&format!("Serving fixtures from {}", dir.display()));
            (store, None)
        }
        None => {
            let client = MongoClient::new(config.mongo_config()?).await?;
            let store: Arc<dyn DocumentStore> = Arc::new(client.clone());
            (store, Some(client))
        }
    };

    let app = create_router(AppState::new(store, web));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    output::success(&format!("Listening on http://{}", addr));
    kv("Profile", &config.profile().to_string());
    kv("Minify HTML", &web.minify_html.to_string());
    info!(addr = %addr, profile = %config.profile(), minify_html = web.minify_html, "Server started");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await;

    if let Some(client) = client {
        client.shutdown().await;
    }

    served.map_err(|e| CliError::Server(e.to_string()))?;
    info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
