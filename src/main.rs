//! Upload relay server.
//!
//! ```text
//!   Caller                       upload-relay                         Upstream
//!  ────────  POST /upload   ┌──────────────────────────────┐
//!            multipart ────▶│ token check → body limits    │
//!                           │ buffer `file` → sanitize name│  POST multipart
//!                           │ re-encode + Bearer key  ─────┼──────────────────▶
//!  ◀──── status + raw body ─┼──────────────────────────────┼◀───── JSON ──────
//!                           └──────────────────────────────┘
//! ```

use tokio::net::TcpListener;

use upload_relay::config::load_from_env;
use upload_relay::lifecycle::{signals, Shutdown};
use upload_relay::observability::{logging, metrics};
use upload_relay::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;

    logging::init(&config.observability.log_level);

    tracing::info!("upload-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.url,
        purpose = ?config.upstream.purpose,
        credential_configured = config.upstream.api_key.is_some(),
        token_required = config.security.proxy_token.is_some(),
        max_upload_bytes = config.security.max_upload_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses when metrics are enabled.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.notified();
    tokio::spawn(async move {
        signals::terminate().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
