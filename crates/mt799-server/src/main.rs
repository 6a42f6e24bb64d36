use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use mt799_api::{AppState, AppStateInner, DEFAULT_MAX_UPLOAD_BYTES};
use mt799_db::{Database, DbLocation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mt799_server=debug,mt799_api=debug,mt799_db=debug,mt799_parser=info,tower_http=debug"
                    .into()
            }),
        )
        .init();

    // Config
    let host = std::env::var("MT799_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MT799_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;
    let db_path: PathBuf = std::env::var("MT799_DB_PATH")
        .unwrap_or_else(|_| "SwiftMessages.db".into())
        .into();
    let max_upload_bytes: usize = match std::env::var("MT799_MAX_UPLOAD_BYTES") {
        Ok(v) => v.parse()?,
        Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
    };

    // The store opens lazily; a bad path only costs the save, not the upload.
    let db = Database::new(DbLocation::File(db_path.clone()));
    if let Err(e) = db.check() {
        warn!("Store at {} is not usable yet: {}", db_path.display(), e);
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        max_upload_bytes,
    });

    let app = mt799_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("MT799 ingest service listening on {}", addr);
    info!("Upload limit: {} bytes", max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
