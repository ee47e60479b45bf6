//! HTTP server with graceful shutdown

use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::{handle_panic, Result},
    middleware::{request_id_layer, request_id_propagation_layer, sensitive_headers_layer},
    state::AppState,
};

/// How often idle rate limiter keys and expired cache entries are dropped
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

/// Wrap `app` in the service-wide tower-http stack
///
/// Each `layer` call wraps everything before it, so panic recovery sits
/// closest to the handlers and CORS is outermost.
pub fn apply_middleware(app: Router, config: &Config) -> Router {
    let body_limit = config.middleware.body_limit_mb * 1024 * 1024;

    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            config.service.timeout(),
        ))
        .layer(request_id_propagation_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(sensitive_headers_layer())
        .layer(request_id_layer())
        .layer(CompressionLayer::new().gzip(config.middleware.compression))
        .layer(build_cors_layer(config))
}

/// Build CORS layer based on configuration
fn build_cors_layer(config: &Config) -> CorsLayer {
    match config.middleware.cors_mode.as_str() {
        "permissive" => {
            tracing::debug!("Enabling permissive CORS");
            CorsLayer::permissive()
        }
        "restrictive" | "disabled" => {
            tracing::debug!("CORS restricted (default deny)");
            CorsLayer::new()
        }
        other => {
            tracing::warn!("Unknown CORS mode: {}, defaulting to permissive", other);
            CorsLayer::permissive()
        }
    }
}

/// Periodically prune rate limiter state and the response cache
pub fn spawn_maintenance<R: Send + Sync + 'static>(
    state: &AppState<R>,
    every: Duration,
) -> JoinHandle<()> {
    let rate_limit = state.rate_limit().clone();
    let response_cache = state.response_cache().clone();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            rate_limit.retain_recent();
            response_cache.evict_expired();
            tracing::trace!(cached = response_cache.len(), "Maintenance pass done");
        }
    })
}

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server with the given router until SIGINT or SIGTERM
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));

        tracing::info!("Starting {} on {}", self.config.service.name, addr);
        self.log_middleware_config();

        let app = apply_middleware(app, &self.config);
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        // Peer addresses feed the rate limiter key
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    fn log_middleware_config(&self) {
        let config = &self.config;
        tracing::info!("Middleware configuration:");
        tracing::info!("  - Request body limit: {} MB", config.middleware.body_limit_mb);
        tracing::info!("  - Compression: {}", config.middleware.compression);
        tracing::info!("  - CORS mode: {}", config.middleware.cors_mode);
        tracing::info!("  - Request timeout: {} seconds", config.service.timeout_secs);

        if config.rate_limit.enabled {
            for rule in &config.rate_limit.rules {
                tracing::info!(
                    "  - Rate limit: {} req / {} sec per client",
                    rule.requests,
                    rule.period_secs
                );
            }
        } else {
            tracing::info!("  - Rate limiting: disabled");
        }

        tracing::info!("  - Cache-Control: {}", config.cache.cache_control());
        if config.cache.response_cache_enabled {
            tracing::info!(
                "  - Response cache TTL: {} seconds",
                config.cache.response_cache_ttl_secs
            );
        } else {
            tracing::info!("  - Response cache: disabled");
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}
