use super::shutdown::shutdown_signal;
use crate::errors::AppError;
use crate::errors::handlers::not_found;
use crate::http::{create_cors_layer, security_headers};
use axum::{BoxError, Router, error_handling::HandleErrorLayer, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::timeout::error::Elapsed;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - Swagger UI at `/swagger-ui`, OpenAPI JSON at `/api-docs/openapi.json`
/// - API routes merged at the root
/// - JSON 404 fallback
/// - Request tracing, security headers, response compression
/// - Request timeout (408) from `server_config.request_timeout`
/// - CORS, only when `server_config.cors_allowed_origins` is set
///
/// Health endpoints are added by the app with `health_router()` and its own
/// readiness handler.
///
/// # Errors
/// Returns `InvalidInput` when the configured CORS origins cannot be parsed.
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(server_config.request_timeout),
        )
        .layer(CompressionLayer::new());

    if let Some(origins) = server_config.cors_allowed_origins.as_deref() {
        info!("CORS configured with allowed origins: {}", origins);
        router = router.layer(create_cors_layer(origins)?);
    }

    Ok(router)
}

/// Renders errors raised by the timeout layer with the usual error body.
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::RequestTimeout
    } else {
        AppError::InternalServerError(format!("Unhandled middleware error: {err}"))
    }
}

/// Serves `router` on `listener` until `signal` completes.
///
/// In-flight requests are drained first, then `cleanup` runs bounded by
/// `shutdown_timeout`.
pub async fn serve_until<F, S>(
    listener: TcpListener,
    router: Router,
    shutdown_timeout: Duration,
    cleanup: F,
    signal: S,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
    S: Future<Output = ()> + Send + 'static,
{
    info!("Server starting on {}", listener.local_addr()?);

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(signal)
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => tracing::warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}

/// Binds the configured address and serves until SIGINT or SIGTERM.
///
/// # Example
/// ```ignore
/// use std::time::Duration;
/// use axum_helpers::server::create_production_app;
///
/// let cleanup = async move {
///     client.shutdown().await;
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(server_config.address()).await?;
    serve_until(listener, router, shutdown_timeout, cleanup, shutdown_signal()).await
}
