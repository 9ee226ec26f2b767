use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::session::AuthState,
    services::auth as auth_service,
    state::AppState,
};

/// The cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Extracts the session token from the request cookies.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
///
/// # Returns
///
/// An `Option` containing the session token if found.
pub fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolves the session cookie into an `AuthState` request extension.
///
/// Mounted on every route except redirects. A store failure is surfaced as
/// a 500 rather than silently downgrading the caller to anonymous.
pub async fn resolve_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session_token = extract_session_token(&cookies);

    let auth = match auth_service::resolve(&state, session_token.as_deref()).await {
        Ok(auth) => auth,
        Err(e) => return e.into_response(),
    };

    if let AuthState::Authenticated(session) = &auth {
        tracing::debug!("✅ User authenticated: {}", session.user_id);
    }

    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// A middleware that requires a valid session to be present.
///
/// # Arguments
///
/// * `request` - The incoming request, already carrying an `AuthState`.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The inner response with the `Session` as an extension, or a 401.
pub async fn require_auth(mut request: Request<Body>, next: Next) -> Response {
    let session = match request.extensions().get::<AuthState>() {
        Some(AuthState::Authenticated(session)) => session.clone(),
        _ => {
            tracing::warn!("❌ No valid session on {}", request.uri().path());
            return AppError::Unauthorized.into_response();
        }
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}
