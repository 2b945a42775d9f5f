use crate::api::{data, views};
use crate::state::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = build_dashboard_cors(state.dashboard_origin.as_deref());

    let ga_routes = Router::new()
        .route("/view", get(views::get_views))
        .route("/data", get(data::get_data))
        .layer(cors);

    let router = Router::new().route("/health", get(health_check));
    let router = if state.base_path.is_empty() {
        router.merge(ga_routes)
    } else {
        router.nest(&state.base_path, ga_routes)
    };

    router
        .layer(axum::middleware::map_response(add_security_headers))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(30),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Inject OWASP-recommended security headers on every HTTP response.
async fn add_security_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    response
}

/// Build CORS layer for the GA routes based on configured origin.
///
/// The token cookie has to travel with cross-origin requests, so a configured
/// dashboard origin gets credentialed CORS.
fn build_dashboard_cors(dashboard_origin: Option<&str>) -> CorsLayer {
    dashboard_origin.map_or_else(
        || {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET])
                .allow_headers(Any)
                .expose_headers([header::CONTENT_DISPOSITION])
        },
        |origin| {
            let allowed_origin = origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("null"));
            CorsLayer::new()
                .allow_origin(allowed_origin)
                .allow_methods([Method::GET])
                .allow_headers([header::CONTENT_TYPE, header::COOKIE])
                .expose_headers([header::CONTENT_DISPOSITION])
                .allow_credentials(true)
        },
    )
}

/// GET /health: simple health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
