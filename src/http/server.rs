//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router (`GET /`, `POST /upload`)
//! - Wire up middleware (request ID, tracing, timeout, body limits, token)
//! - Serve on a listener until the shutdown future resolves

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::handlers;
use crate::http::request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::relay::UpstreamClient;
use crate::security::limits::{body_budget, enforce_body_budget};
use crate::security::require_proxy_token;

pub const UPLOAD_PATH: &str = "/upload";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub upstream: Arc<UpstreamClient>,
}

/// HTTP server for the upload relay.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let upstream = Arc::new(UpstreamClient::from_config(&config.upstream)?);
        let config = Arc::new(config);

        let state = AppState {
            config: config.clone(),
            upstream,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let budget = body_budget(config.security.max_upload_bytes);

        // Last layer added runs first: token check, then body limits.
        let upload = post(handlers::upload)
            .layer::<_, Infallible>(DefaultBodyLimit::max(budget))
            .layer::<_, Infallible>(middleware::from_fn_with_state(
                state.clone(),
                enforce_body_budget,
            ))
            .layer::<_, Infallible>(middleware::from_fn_with_state(
                state.clone(),
                require_proxy_token,
            ));

        Router::new()
            .route("/", get(handlers::health))
            .route(UPLOAD_PATH, upload)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                request_id = %request_id(request.headers()),
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The fully layered router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` resolves, then let
    /// in-flight requests finish.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            token_required = self.config.security.proxy_token.is_some(),
            max_upload_bytes = self.config.security.max_upload_bytes,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
