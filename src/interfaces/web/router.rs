use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, header},
    middleware,
    middleware::Next,
    routing::{get, post},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::AppState;
use super::handlers::{executive, frontend, solution};

pub fn build_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/api/executive/status", get(executive::status_endpoint))
        .route("/api/executive/operations", get(executive::operations_endpoint))
        .route("/api/executive/start", post(executive::start_endpoint))
        .route("/api/executive/{*rest}", post(executive::stop_endpoint));

    if state.catalog.is_some() {
        api = api
            .route("/api/solution/list", get(solution::list_processes_endpoint))
            .route("/api/solution/status", get(solution::solution_status_endpoint));
    }

    Router::new()
        .route("/", get(frontend::index_endpoint))
        .route("/index.html", get(frontend::index_endpoint))
        .merge(api)
        .fallback(frontend::static_endpoint)
        .layer(middleware::from_fn(security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
