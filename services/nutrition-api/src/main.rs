//! Nutriq Nutrition API
//!
//! Backend service for the nutrition tracker.
//!
//! ## REST Endpoints
//!
//! - `GET /api/v1/trial/status` - Evaluate the caller's trial state
//! - `POST /api/v1/trial/device` - Fraud-gated trial grant + device audit log
//! - `POST /api/v1/trial/referral` - Redeem a referral code
//! - `POST /api/v1/trial/referral/confirm` - Verification event for the caller
//! - `GET /api/v1/referrals` - Referral progress
//! - `GET|POST /api/v1/meals`, `DELETE /api/v1/meals/{id}` - Meal log
//! - `GET /api/v1/summary/daily|weekly` - Calorie/macro totals
//! - `GET|PUT /api/v1/profile`, `GET|PUT /api/v1/goals` - Profile and goals
//! - `POST /api/v1/analyze-food` - Photo analysis proxy
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod extractors;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use nutriq_analysis::AnalysisClient;
use nutriq_auth::AuthClient;
use nutriq_db::pg::Repositories;
use nutriq_trial_core::TrialService;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

/// Upload cap for meal photos
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("nutrition_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Nutriq Nutrition API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(http_port = config.http_port, "Configuration loaded");

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool = nutriq_db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Create repositories
    let repos = Repositories::new(pool.clone());

    // Create domain services
    let auth = AuthClient::new(config.auth.clone())?;
    let trial = TrialService::new(
        std::sync::Arc::new(repos.trials.clone()),
        std::sync::Arc::new(repos.referrals.clone()),
        std::sync::Arc::new(repos.devices.clone()),
    );
    let analysis = AnalysisClient::new(config.analysis.clone())?;

    // Create application state
    let state = AppState::new(auth, trial, analysis, repos, pool, config.clone());

    // Build HTTP router
    let app = build_router(state.clone(), metrics_handle);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    run_http_server(app, addr).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // API v1 routes
    let api_v1 = Router::new()
        // Trial routes
        .route("/trial/status", get(handlers::trial_status))
        .route("/trial/device", post(handlers::register_device))
        .route("/trial/referral", post(handlers::apply_referral))
        .route("/trial/referral/confirm", post(handlers::confirm_referral))
        .route("/referrals", get(handlers::get_referrals))
        // Meal routes
        .route(
            "/meals",
            get(handlers::list_meals).post(handlers::create_meal),
        )
        .route("/meals/{id}", delete(handlers::delete_meal))
        .route("/summary/daily", get(handlers::daily_summary))
        .route("/summary/weekly", get(handlers::weekly_summary))
        // Profile routes
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/goals",
            get(handlers::get_goals).put(handlers::update_goals),
        )
        // Photo analysis (raised body limit for image uploads)
        .route(
            "/analyze-food",
            post(handlers::analyze_food).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        );

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    // Combine all routes
    Router::new()
        .nest("/api/v1", api_v1)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .merge(metrics_route) // Metrics route without timeout
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let service: IntoMakeServiceWithConnectInfo<Router, SocketAddr> =
        app.into_make_service_with_connect_info();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Most handlers are one or two store round trips; the analysis proxy
    // can legitimately take tens of seconds.
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 5.0, 30.0];

    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            latency_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full("nutrition_operation_duration_seconds".to_string()),
            latency_buckets,
        )?;

    let handle = builder.install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!("trial_grants_total", "Total trials granted at signup");
    metrics::describe_counter!("referrals_applied_total", "Total referral codes redeemed");
    metrics::describe_counter!(
        "referral_unlocks_total",
        "Total referral-threshold trial extensions"
    );
    metrics::describe_counter!("meals_logged_total", "Total meals logged by source");
    metrics::describe_counter!(
        "analysis_requests_total",
        "Total photo analysis requests by result"
    );
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds"
    );
    metrics::describe_histogram!(
        "nutrition_operation_duration_seconds",
        "Operation latency in seconds by operation and result"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
