use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use http::{header, HeaderValue, Method};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// JSON bodies here are a URL or a credential pair.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Builds the CORS layer from the configured origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the application router.
///
/// Rate limiting is left to the caller since it needs the peer address.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::status::status))
        .route("/url", post(handlers::url::shorten))
        .route("/signup", post(handlers::auth::signup))
        .route("/user/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/user/login", post(handlers::auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/url", get(handlers::url::list_links))
        .route("/url/{short_id}", delete(handlers::url::delete_link))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
        .route_layer(from_fn(middleware_layer::auth::require_auth))
        .with_state(state.clone());

    // Redirects never look at the session.
    let redirect_routes = Router::new()
        .route("/{short_id}", get(handlers::url::redirect))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::resolve_auth,
        ))
        .merge(redirect_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&state.config.cors_origins))
}
